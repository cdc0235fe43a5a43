use secrecy::{ExposeSecret, SecretString};

/// Username/password pair presented to the cluster's login endpoint.
///
/// The password stays wrapped in [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Form fields sent to the login endpoint.
    pub(crate) fn form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("username".to_owned(), self.username.clone()),
            (
                "password".to_owned(),
                self.password.expose_secret().to_owned(),
            ),
        ]
    }
}
