/// Level monthly payment that amortizes `principal` over `term_months` at
/// `annual_rate` (a fraction, compounded monthly).
///
/// A zero rate is straight-line, `principal / term_months` exactly. A zero term
/// has no schedule and pays nothing.
pub fn monthly_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return 0.0;
    }
    let n = f64::from(term_months);
    let r = annual_rate / 12.0;
    if r == 0.0 {
        return principal / n;
    }
    principal * r / (1.0 - (1.0 + r).powf(-n))
}
