//! Generic fuzzy inference: membership shapes, linguistic variables, a compiled
//! rule base and the weighted-average defuzzifier.

pub mod defuzzify;
pub mod membership;
pub mod rules;
pub mod variables;

pub use defuzzify::{Defuzzified, Defuzzifier};
pub use membership::{ramp_down, ramp_up, trapezoidal, triangular, MembershipShape, ShapeError};
pub use rules::{Activation, ClauseSpec, Consequent, Rule, RuleBase, RuleError, RuleSpec, ANY_LABEL};
pub use variables::{
    Domain, Fuzzified, FuzzySet, FuzzyVariable, VariableError, VariableId, VariableSet,
    VariableValues,
};
