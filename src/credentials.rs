//! API token lookup from the OS credential store (Secret Service on
//! Linux, Keychain on macOS, Credential Manager on Windows).

use keyring::Entry;

const SERVICE: &str = "gitlab";
const ACCOUNT: &str = "only-secret";

/// Read the GitLab API token. Looked up once per run; a missing entry or
/// unavailable store propagates as an error.
pub fn lookup() -> Result<String, keyring::Error> {
    Entry::new(SERVICE, ACCOUNT)?.get_password()
}
