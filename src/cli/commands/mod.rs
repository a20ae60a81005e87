//! CLI command implementations
//!
//! Every command returns the process exit code:
//! 0 success, 1 partial failure, 2 configuration error, 5 fatal error.

pub mod deactivate;
pub mod export;
pub mod replicate;
pub mod validate;

use crate::domain::TabopsError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL_FAILURE: i32 = 1;
pub const EXIT_CONFIGURATION: i32 = 2;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for a command that failed with `error`
pub fn exit_code_for(error: &TabopsError) -> i32 {
    if error.is_configuration() {
        EXIT_CONFIGURATION
    } else {
        EXIT_FATAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServerError;

    #[test]
    fn test_exit_codes() {
        let config = TabopsError::Configuration("bad".to_string());
        assert_eq!(exit_code_for(&config), EXIT_CONFIGURATION);

        let not_found = TabopsError::NotFound("Workbook".to_string());
        assert_eq!(exit_code_for(&not_found), EXIT_FATAL);

        let auth = TabopsError::Server(ServerError::AuthenticationFailed("401".to_string()));
        assert_eq!(exit_code_for(&auth), EXIT_FATAL);
    }
}
