use crate::orders::{OrderError, OrderStatus};

/// Service for managing order status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Any non-terminal status → any later status along
    ///   pending → confirmed → processing → shipped → delivered (skipping allowed)
    /// - Any non-terminal status → Cancelled
    /// - Any status → Same status (idempotent)
    ///
    /// Delivered and Cancelled are terminal.
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        // Same status is always valid (idempotent)
        if from == to {
            return true;
        }

        if from.is_terminal() {
            return false;
        }

        match (from.rank(), to.rank()) {
            (_, None) => true,
            (Some(current), Some(next)) => next > current,
            (None, Some(_)) => false,
        }
    }

    /// Attempt to transition from one status to another
    ///
    /// # Returns
    /// `Ok(to)` if the transition is valid, `Err(OrderError::InvalidTransition)` otherwise
    pub fn transition(from: OrderStatus, to: OrderStatus) -> Result<OrderStatus, OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(OrderError::InvalidTransition { from, to })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Forward moves
    #[test]
    fn test_pending_to_confirmed() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Confirmed
        ));
    }

    #[test]
    fn test_confirmed_to_processing() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Confirmed,
            OrderStatus::Processing
        ));
    }

    #[test]
    fn test_processing_to_shipped() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Processing,
            OrderStatus::Shipped
        ));
    }

    #[test]
    fn test_shipped_to_delivered() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Shipped,
            OrderStatus::Delivered
        ));
    }

    // Skipping ahead is accepted
    #[test]
    fn test_pending_to_shipped() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Shipped
        ));
    }

    #[test]
    fn test_confirmed_to_delivered() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Confirmed,
            OrderStatus::Delivered
        ));
    }

    // Cancellation
    #[test]
    fn test_pending_to_cancelled() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Pending,
            OrderStatus::Cancelled
        ));
    }

    #[test]
    fn test_shipped_to_cancelled() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Shipped,
            OrderStatus::Cancelled
        ));
    }

    #[test]
    fn test_delivered_to_cancelled() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Delivered,
            OrderStatus::Cancelled
        ));
    }

    // Backward moves
    #[test]
    fn test_confirmed_to_pending() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Confirmed,
            OrderStatus::Pending
        ));
    }

    #[test]
    fn test_shipped_to_processing() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Shipped,
            OrderStatus::Processing
        ));
    }

    #[test]
    fn test_delivered_to_shipped() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Delivered,
            OrderStatus::Shipped
        ));
    }

    // Cancelled is terminal
    #[test]
    fn test_cancelled_to_pending() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Cancelled,
            OrderStatus::Pending
        ));
    }

    #[test]
    fn test_cancelled_to_delivered() {
        assert!(!StatusMachine::is_valid_transition(
            OrderStatus::Cancelled,
            OrderStatus::Delivered
        ));
    }

    // Same status transitions (no-op)
    #[test]
    fn test_same_status_delivered() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Delivered,
            OrderStatus::Delivered
        ));
    }

    #[test]
    fn test_same_status_cancelled() {
        assert!(StatusMachine::is_valid_transition(
            OrderStatus::Cancelled,
            OrderStatus::Cancelled
        ));
    }

    #[test]
    fn test_transition_valid() {
        let result = StatusMachine::transition(OrderStatus::Pending, OrderStatus::Confirmed);
        assert_eq!(result.unwrap(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_transition_invalid() {
        let result = StatusMachine::transition(OrderStatus::Processing, OrderStatus::Pending);
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Processing,
                to: OrderStatus::Pending
            }
        ));
        assert!(err.to_string().contains("Invalid status transition"));
    }
}
