use super::rules::Activation;

/// Crisp result of a weighted-average reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defuzzified {
    pub score: f64,
    pub fell_back: bool,
}

/// Weighted-average defuzzifier with an explicit policy fallback for the case
/// where no rule fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Defuzzifier {
    fallback: f64,
}

impl Defuzzifier {
    pub fn new(fallback: f64) -> Self {
        Self { fallback }
    }

    pub fn defuzzify(&self, activations: &[Activation<'_>]) -> Defuzzified {
        let (weighted, total) = activations
            .iter()
            .fold((0.0, 0.0), |(weighted, total), activation| {
                (
                    weighted + activation.strength * activation.rule.consequent(),
                    total + activation.strength,
                )
            });

        if total > 0.0 {
            Defuzzified {
                score: weighted / total,
                fell_back: false,
            }
        } else {
            Defuzzified {
                score: self.fallback,
                fell_back: true,
            }
        }
    }
}
