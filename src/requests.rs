//! Ride request lifecycle.
//!
//! A rider asks to join a published offer; the driver accepts or rejects.
//! `pending → accepted | rejected`, terminal once set. One pending request
//! per user per offer.

use crate::traits::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDecision {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// The user already has a request on this offer.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondError {
    /// The request was already accepted or rejected; decisions are final.
    AlreadyDecided,
}

/// A rider's seat request on one offer.
#[derive(Debug, Clone)]
pub struct RideRequest<UserId> {
    pub user: UserId,
    pub status: RequestStatus,
    /// Unix timestamp (seconds).
    pub requested_at: i64,
}

impl<UserId: Id> RideRequest<UserId> {
    pub fn new(user: UserId, requested_at: i64) -> Self {
        Self {
            user,
            status: RequestStatus::Pending,
            requested_at,
        }
    }

    /// Apply the driver's decision. A decided request is terminal.
    pub fn respond(&mut self, decision: RequestDecision) -> Result<(), RespondError> {
        if self.status != RequestStatus::Pending {
            return Err(RespondError::AlreadyDecided);
        }

        self.status = match decision {
            RequestDecision::Accept => RequestStatus::Accepted,
            RequestDecision::Reject => RequestStatus::Rejected,
        };
        Ok(())
    }
}

/// Append a new pending request for `user`, refusing duplicates.
pub fn add_request<UserId: Id>(
    requests: &mut Vec<RideRequest<UserId>>,
    user: UserId,
    requested_at: i64,
) -> Result<&RideRequest<UserId>, RequestError> {
    if requests.iter().any(|request| request.user == user) {
        return Err(RequestError::Duplicate);
    }

    requests.push(RideRequest::new(user, requested_at));
    Ok(requests.last().expect("just pushed"))
}
