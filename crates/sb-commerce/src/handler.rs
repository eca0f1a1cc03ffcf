//! Capability handler trait: one implementation per domain.

use async_trait::async_trait;
use sb_protocol::{Domain, Operation, ParameterSet};

use crate::error::{CommerceError, CommerceResult};

/// Executes the operations of one capability domain.
///
/// Handlers receive parameters that already passed requirement validation
/// and return the Hebrew reply for the user. Expected absences (unknown
/// product name, missing order) are reported as [`CommerceError::NotFound`].
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// Domain this handler serves.
    fn domain(&self) -> Domain;

    async fn handle(&self, operation: Operation, params: &ParameterSet) -> CommerceResult<String>;
}

/// Error for an operation routed to the wrong handler.
pub(crate) fn wrong_domain(operation: Operation, expected: Domain) -> CommerceError {
    CommerceError::InvalidParameter(format!(
        "operation {operation} is not served by the {expected} handler"
    ))
}

/// Required text parameter, trimmed.
pub(crate) fn require_text(params: &ParameterSet, names: &[&str]) -> CommerceResult<String> {
    params
        .text_any(names)
        .ok_or_else(|| missing(names))
}

pub(crate) fn require_integer(params: &ParameterSet, name: &str) -> CommerceResult<i64> {
    match params.get(name) {
        Some(value) if !value.is_null() => value.as_i64().ok_or_else(|| {
            CommerceError::InvalidParameter(format!("{name} must be a whole number"))
        }),
        _ => Err(missing(&[name])),
    }
}

pub(crate) fn require_number(params: &ParameterSet, names: &[&str]) -> CommerceResult<f64> {
    if !names.iter().any(|n| params.is_present(n)) {
        return Err(missing(names));
    }
    params
        .number_any(names)
        .ok_or_else(|| CommerceError::InvalidParameter(format!("{} must be a number", names[0])))
}

fn missing(names: &[&str]) -> CommerceError {
    CommerceError::InvalidParameter(format!("missing parameter {}", names.first().unwrap_or(&"?")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_integer_rejects_text() {
        let params = ParameterSet::new().with("order_id", "abc");
        assert!(matches!(
            require_integer(&params, "order_id"),
            Err(CommerceError::InvalidParameter(_))
        ));
        assert!(require_integer(&ParameterSet::new(), "order_id").is_err());
        assert_eq!(
            require_integer(&ParameterSet::new().with("order_id", 5_i64), "order_id").unwrap(),
            5
        );
    }

    #[test]
    fn require_number_accepts_alias() {
        let params = ParameterSet::new().with("new_price", "79.90");
        assert_eq!(require_number(&params, &["price", "new_price"]).unwrap(), 79.9);
    }
}
