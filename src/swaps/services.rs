//! Swap request lifecycle: creation, listing, role-gated transitions and
//! removal.

use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{PartySummary, SwapView},
    repo_types::{NewSwapRequest, SwapRequest, SwapStatus},
};
use crate::{
    error::{ApiError, ApiResult},
    mail::templates,
    state::AppState,
};

/// Which party of a request the caller is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Sender,
    Recipient,
}

impl Party {
    pub fn of(swap: &SwapRequest, account_id: Uuid) -> Option<Self> {
        if swap.sender == account_id {
            Some(Party::Sender)
        } else if swap.recipient == account_id {
            Some(Party::Recipient)
        } else {
            None
        }
    }
}

/// Who may move a pending request to `target`.
pub fn may_transition(party: Party, target: SwapStatus) -> bool {
    matches!(
        (party, target),
        (Party::Recipient, SwapStatus::Accepted)
            | (Party::Recipient, SwapStatus::Rejected)
            | (Party::Sender, SwapStatus::Cancelled)
    )
}

fn not_pending(status: SwapStatus) -> ApiError {
    ApiError::InvalidState(format!(
        "Request is already {status}. Cannot change status."
    ))
}

pub async fn create(
    state: &AppState,
    sender_id: Uuid,
    recipient_id: Uuid,
    skills_involved: Vec<String>,
    message: String,
) -> ApiResult<SwapView> {
    if sender_id == recipient_id {
        return Err(ApiError::invalid("Cannot send a swap request to yourself."));
    }
    if skills_involved.is_empty() {
        return Err(ApiError::invalid("At least one skill must be involved"));
    }
    if message.trim().is_empty() {
        return Err(ApiError::invalid("Message is required"));
    }

    let recipient = state
        .accounts
        .find_by_id(recipient_id)
        .await?
        .filter(|a| a.is_discoverable())
        .ok_or_else(|| ApiError::not_found("Recipient not found or profile is private."))?;
    let sender = state
        .accounts
        .find_by_id(sender_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let swap = state
        .swaps
        .create(NewSwapRequest {
            sender: sender_id,
            recipient: recipient_id,
            skills_involved,
            message,
        })
        .await?;
    info!(swap_id = %swap.id, %sender_id, %recipient_id, "swap request created");

    state.notifier.spawn(templates::swap_received(
        &recipient.email,
        &sender.name,
        &swap.message,
        &swap.skills_involved,
    ));

    Ok(SwapView::new(
        swap,
        Some(PartySummary::from(&sender)),
        Some(PartySummary::from(&recipient)),
    ))
}

pub async fn list_sent(state: &AppState, caller: Uuid) -> ApiResult<Vec<SwapView>> {
    let swaps = state.swaps.list_by_sender(caller).await?;
    enrich(state, swaps).await
}

pub async fn list_received(state: &AppState, caller: Uuid) -> ApiResult<Vec<SwapView>> {
    let swaps = state.swaps.list_by_recipient(caller).await?;
    enrich(state, swaps).await
}

async fn enrich(state: &AppState, swaps: Vec<SwapRequest>) -> ApiResult<Vec<SwapView>> {
    let mut ids: Vec<Uuid> = swaps
        .iter()
        .flat_map(|s| [s.sender, s.recipient])
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let parties: HashMap<Uuid, PartySummary> = state
        .accounts
        .find_many(&ids)
        .await?
        .iter()
        .map(|a| (a.id, PartySummary::from(a)))
        .collect();

    Ok(swaps
        .into_iter()
        .map(|s| {
            let sender = parties.get(&s.sender).cloned();
            let recipient = parties.get(&s.recipient).cloned();
            SwapView::new(s, sender, recipient)
        })
        .collect())
}

/// Moves a pending request to a terminal status on behalf of `caller`.
///
/// Authorization is checked before lifecycle state: a caller who could never
/// make this move gets `Forbidden` whatever the current status.
pub async fn transition(
    state: &AppState,
    caller: Uuid,
    swap_id: Uuid,
    target: SwapStatus,
) -> ApiResult<SwapView> {
    let swap = state
        .swaps
        .find_by_id(swap_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Swap request not found."))?;

    let allowed = Party::of(&swap, caller).is_some_and(|p| may_transition(p, target));
    if !allowed {
        warn!(%caller, %swap_id, target = %target, "forbidden swap transition");
        return Err(ApiError::forbidden(
            "You are not authorized to perform this action on this request.",
        ));
    }
    if swap.status.is_terminal() {
        return Err(not_pending(swap.status));
    }

    let Some(updated) = state.swaps.transition_if_pending(swap_id, target).await? else {
        // Lost a race with a concurrent transition.
        let current = state
            .swaps
            .find_by_id(swap_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Swap request not found."))?;
        warn!(%swap_id, current = %current.status, "swap changed concurrently");
        return Err(not_pending(current.status));
    };
    info!(%swap_id, %caller, status = %target, "swap request transitioned");

    let actor = state.accounts.find_by_id(caller).await?;
    let counterpart = state.accounts.find_by_id(updated.counterpart(caller)).await?;
    if let (Some(actor), Some(counterpart)) = (&actor, &counterpart) {
        state.notifier.spawn(templates::swap_status_changed(
            &counterpart.email,
            &actor.name,
            target,
            &updated.skills_involved,
        ));
    }

    let (sender, recipient) = if updated.sender == caller {
        (actor, counterpart)
    } else {
        (counterpart, actor)
    };
    Ok(SwapView::new(
        updated,
        sender.as_ref().map(PartySummary::from),
        recipient.as_ref().map(PartySummary::from),
    ))
}

/// Hard delete by either party once the request has left `pending`.
pub async fn delete(state: &AppState, caller: Uuid, swap_id: Uuid) -> ApiResult<()> {
    let swap = state
        .swaps
        .find_by_id(swap_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Swap request not found."))?;
    if !swap.is_party(caller) {
        warn!(%caller, %swap_id, "forbidden swap deletion");
        return Err(ApiError::forbidden(
            "You are not authorized to delete this request.",
        ));
    }
    if swap.status == SwapStatus::Pending {
        return Err(ApiError::InvalidState(
            "Only completed requests can be deleted.".into(),
        ));
    }
    if !state.swaps.delete(swap_id).await? {
        return Err(ApiError::not_found("Swap request not found."));
    }
    info!(%swap_id, %caller, "swap request deleted");
    Ok(())
}
