//! Credential source for providers that authenticate requests.

/// Supplies the current bearer credential.
///
/// Acquisition, storage and rotation live outside this crate; providers ask
/// for the credential on every request.
pub trait CredentialProvider: Send + Sync {
    fn credential(&self) -> String;
}

/// A credential fixed at construction time.
#[derive(Clone)]
pub struct StaticCredential {
    token: String,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl CredentialProvider for StaticCredential {
    fn credential(&self) -> String {
        self.token.clone()
    }
}
