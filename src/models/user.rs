use serde::{Deserialize, Serialize};

/// Profile of the signed-in user, as returned by the auth endpoints. The
/// backend sends more fields than these; the rest are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub profile_pic: Option<String>,
}
