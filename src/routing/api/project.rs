use axum::extract::State;
use clientdesk_api::Payload;
use clientdesk_api::project::ProjectInfo;

use crate::state::ArcShared;

pub async fn retrieve(
    State(state): State<ArcShared>,
) -> Payload<ProjectInfo> {
    Payload::new(state.project().info())
}
