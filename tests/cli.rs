use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

mod test {

    use super::*;

    #[test]
    fn cli_version_flag() {
        Command::cargo_bin("keywarden")
            .unwrap()
            .arg("--version")
            .assert()
            .success()
            .stdout(contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn cli_help_lists_subcommands() {
        Command::cargo_bin("keywarden")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(contains("audit").and(contains("report")));
    }

    #[test]
    fn audit_help_documents_the_environment() {
        Command::cargo_bin("keywarden")
            .unwrap()
            .args(["audit", "--help"])
            .assert()
            .success()
            .stdout(contains("EMAIL_FROM_ADDRESS").and(contains("DRY_RUN")));
    }

    #[test]
    fn audit_requires_a_sender_address() {
        Command::cargo_bin("keywarden")
            .unwrap()
            .env_remove("EMAIL_FROM_ADDRESS")
            .arg("audit")
            .assert()
            .failure()
            .stderr(contains("--from-address"));
    }

    #[test]
    fn older_than_must_be_a_day_count() {
        Command::cargo_bin("keywarden")
            .unwrap()
            .args(["report", "--older-than", "soon"])
            .assert()
            .failure()
            .stderr(contains("--older-than"));
    }

    #[test]
    fn audit_without_credentials_aborts_with_a_config_error() {
        let missing = std::env::temp_dir().join("keywarden-no-such-aws-dir");
        Command::cargo_bin("keywarden")
            .unwrap()
            .env_remove("AWS_ACCESS_KEY_ID")
            .env_remove("AWS_SECRET_ACCESS_KEY")
            .env_remove("AWS_SESSION_TOKEN")
            .env_remove("AWS_WEB_IDENTITY_TOKEN_FILE")
            .env_remove("AWS_ROLE_ARN")
            .env_remove("AWS_CONTAINER_CREDENTIALS_RELATIVE_URI")
            .env_remove("AWS_CONTAINER_CREDENTIALS_FULL_URI")
            .env_remove("AWS_CONTAINER_AUTHORIZATION_TOKEN")
            .env_remove("DRY_RUN")
            .env("AWS_CONFIG_FILE", missing.join("config"))
            .env("AWS_SHARED_CREDENTIALS_FILE", missing.join("credentials"))
            .env("AWS_EC2_METADATA_DISABLED", "true")
            .env("AWS_PROFILE", "keywarden-nonexistent")
            .env("AWS_REGION", "us-east-1")
            .args(["audit", "--from-address", "ops@example.com"])
            .assert()
            .code(2)
            .stdout(contains("Audit aborted"))
            .stdout(contains("Couldn't load configuration"));
    }
}
