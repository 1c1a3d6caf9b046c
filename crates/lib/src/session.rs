//! NLU session identifiers.
//!
//! A session id groups consecutive turns of one conversation on the backend. It is derived
//! from the message fields named by `sessionIdProps` (default `user` + `channel`), so the
//! same conversation always maps to the same id without any local state.

use crate::message::Message;
use uuid::Uuid;

/// Unique session identifier (opaque string).
pub type SessionId = String;

/// Namespace for name-based (v5) session ids.
const SESSION_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_4a2e_9b3d_4e57_8c11_d2a0_5f3b_7e94);

/// Marker for a field the message does not carry. Cannot collide with a length-prefixed value.
const ABSENT: &str = "-";

/// Derive the session id for `message` from the given field names, in order.
///
/// Each value is length-prefixed before hashing, so `("ab", "c")` and `("a", "bc")`
/// produce different ids.
pub fn session_id<S: AsRef<str>>(props: &[S], message: &Message) -> SessionId {
    let mut key = String::new();
    for prop in props {
        match message.field(prop.as_ref()) {
            Some(value) => {
                key.push_str(&value.len().to_string());
                key.push(':');
                key.push_str(&value);
            }
            None => key.push_str(ABSENT),
        }
        key.push(';');
    }
    Uuid::new_v5(&SESSION_NAMESPACE, key.as_bytes()).to_string()
}

/// Full session resource path for a project: `projects/<project>/agent/sessions/<session>`.
pub fn session_path(project_id: &str, session_id: &str) -> String {
    format!("projects/{}/agent/sessions/{}", project_id, session_id)
}
