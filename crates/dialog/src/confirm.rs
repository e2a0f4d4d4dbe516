//! Human-readable summary rendering for the confirmation step.

use wayfarer_core::JourneySpec;

/// Currency label used when the recognized budget carried no unit.
pub const DEFAULT_BUDGET_UNIT: &str = "EUR";

pub const CONFIRM_LEAD_IN: &str = "Please confirm the following:";
pub const APOLOGY: &str = "Sorry, I could not be of any help this time.";

fn slot(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("unknown")
}

pub fn travel_line(spec: &JourneySpec) -> String {
    format!(
        "You want to travel to {} from {}",
        slot(&spec.destination),
        slot(&spec.origin)
    )
}

pub fn dates_line(spec: &JourneySpec) -> String {
    format!(
        "You would leave on {} and be back for {}.",
        slot(&spec.departure_date),
        slot(&spec.return_date)
    )
}

/// The yes/no prompt line itself.
pub fn budget_line(spec: &JourneySpec) -> String {
    match &spec.max_budget {
        Some(budget) => format!(
            "Your budget is {} {} top.",
            budget.amount,
            budget.unit.as_deref().unwrap_or(DEFAULT_BUDGET_UNIT)
        ),
        None => "Your budget is unknown.".to_owned(),
    }
}

/// Closing announcement once the traveller confirmed the specification.
pub fn confirmed_announcement(spec: &JourneySpec) -> String {
    let (amount, unit) = match &spec.max_budget {
        Some(budget) => (
            budget.amount.to_string(),
            budget.unit.clone().unwrap_or_else(|| DEFAULT_BUDGET_UNIT.to_owned()),
        ),
        None => ("unknown".to_owned(), DEFAULT_BUDGET_UNIT.to_owned()),
    };
    format!(
        "You have confirmed that you want to go to {} from {} on {} to {}. Your best budget is {} {}.",
        slot(&spec.destination),
        slot(&spec.origin),
        slot(&spec.departure_date),
        slot(&spec.return_date),
        amount,
        unit,
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use wayfarer_core::{Budget, JourneySpec};

    use super::{budget_line, confirmed_announcement, dates_line, travel_line};

    fn spec() -> JourneySpec {
        JourneySpec {
            destination: Some("Paris".to_owned()),
            origin: Some("London".to_owned()),
            departure_date: Some("2024-06-01".to_owned()),
            return_date: Some("2024-06-10".to_owned()),
            max_budget: Some(Budget {
                amount: Decimal::new(1000, 0),
                unit: Some("EUR".to_owned()),
            }),
            ..JourneySpec::default()
        }
    }

    #[test]
    fn summary_lines_read_naturally() {
        let spec = spec();
        assert_eq!(travel_line(&spec), "You want to travel to Paris from London");
        assert_eq!(
            dates_line(&spec),
            "You would leave on 2024-06-01 and be back for 2024-06-10."
        );
        assert_eq!(budget_line(&spec), "Your budget is 1000 EUR top.");
    }

    #[test]
    fn missing_unit_falls_back_to_the_default_label() {
        let mut spec = spec();
        spec.max_budget = Some(Budget { amount: Decimal::new(750, 0), unit: None });
        assert_eq!(budget_line(&spec), "Your budget is 750 EUR top.");
    }

    #[test]
    fn announcement_restates_every_slot() {
        assert_eq!(
            confirmed_announcement(&spec()),
            "You have confirmed that you want to go to Paris from London on 2024-06-01 to \
             2024-06-10. Your best budget is 1000 EUR."
        );
    }
}
