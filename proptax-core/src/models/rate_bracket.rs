use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// On-disk stand-in for an unbounded bracket ceiling. The data files predate
/// JSON `null` handling here and store this constant instead; it is translated
/// to `None` immediately on deserialisation and back on write.
pub const UPPER_BOUND_SENTINEL: i64 = 1_000_000_000_000;

/// One band of a progressive rate schedule.
///
/// `rate_percent` is a percentage (`0.4` means 0.4%). `upper_bound == None`
/// marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBracket {
    pub lower_bound: Decimal,
    #[serde(with = "upper_bound_repr")]
    pub upper_bound: Option<Decimal>,
    pub base_amount: Decimal,
    pub rate_percent: Decimal,
}

mod upper_bound_repr {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::UPPER_BOUND_SENTINEL;

    pub fn serialize<S>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bound) => bound.serialize(serializer),
            None => Decimal::from(UPPER_BOUND_SENTINEL).serialize(serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Accept both `null` and the legacy sentinel as "unbounded".
        let raw = Option::<Decimal>::deserialize(deserializer)?;
        Ok(raw.filter(|bound| *bound < Decimal::from(UPPER_BOUND_SENTINEL)))
    }
}

/// Validates a full bracket list for one rate schedule.
///
/// Returns every problem found, not just the first, so callers can surface
/// the complete picture in one message. An empty vector means the list is
/// valid.
///
/// A valid list starts at a lower bound of zero, tiles contiguously
/// (`brackets[i].upper_bound == brackets[i+1].lower_bound`), and ends with a
/// single unbounded bracket.
pub fn validate_brackets(brackets: &[RateBracket]) -> Vec<String> {
    let mut problems = Vec::new();

    if brackets.is_empty() {
        problems.push("at least one bracket is required".to_string());
        return problems;
    }

    for (index, bracket) in brackets.iter().enumerate() {
        let position = index + 1;
        if bracket.lower_bound < Decimal::ZERO {
            problems.push(format!(
                "bracket {position}: lower bound {} is negative",
                bracket.lower_bound
            ));
        }
        if bracket.base_amount < Decimal::ZERO {
            problems.push(format!(
                "bracket {position}: base amount {} is negative",
                bracket.base_amount
            ));
        }
        if bracket.rate_percent < Decimal::ZERO || bracket.rate_percent > Decimal::ONE_HUNDRED {
            problems.push(format!(
                "bracket {position}: rate {}% is outside 0-100%",
                bracket.rate_percent
            ));
        }
        if let Some(upper) = bracket.upper_bound {
            if upper <= bracket.lower_bound {
                problems.push(format!(
                    "bracket {position}: upper bound {upper} does not exceed lower bound {}",
                    bracket.lower_bound
                ));
            }
        }
    }

    if brackets[0].lower_bound != Decimal::ZERO {
        problems.push(format!(
            "bracket 1: schedule must start at 0, got {}",
            brackets[0].lower_bound
        ));
    }

    for (index, pair) in brackets.windows(2).enumerate() {
        let position = index + 1;
        match pair[0].upper_bound {
            Some(upper) if upper != pair[1].lower_bound => problems.push(format!(
                "bracket {position}: upper bound {upper} does not meet the next lower bound {}",
                pair[1].lower_bound
            )),
            Some(_) => {}
            None => problems.push(format!(
                "bracket {position}: only the last bracket may be unbounded"
            )),
        }
    }

    if let Some(last) = brackets.last() {
        if last.upper_bound.is_some() {
            problems.push("the last bracket must be unbounded".to_string());
        }
    }

    problems
}
