use anyhow::{bail, Context, Result};
use aws_config::{
    meta::region::RegionProviderChain, sts::AssumeRoleProvider, BehaviorVersion, Region,
    SdkConfig,
};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use tracing::{debug, info};

/// Region used when neither the flag nor the default chain provides one.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Where the SDK configuration comes from.
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub role_arn: Option<String>,
}

/// Load the shared SDK configuration from the default provider chain.
///
/// An explicit region wins over the environment; `us-east-1` is the last
/// resort. When `role_arn` is set, credentials from the chain are only used to
/// assume that role. Credentials are resolved once up front, so a missing or
/// broken setup fails here instead of at the first IAM call.
pub async fn load_sdk_config(settings: &AwsSettings) -> Result<SdkConfig> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = settings.profile.as_deref() {
        loader = loader.profile_name(profile);
    }

    let region_provider = RegionProviderChain::first_try(settings.region.clone().map(Region::new))
        .or_default_provider()
        .or_else(FALLBACK_REGION);
    let base_config = loader.region(region_provider).load().await;

    let config = match settings.role_arn.as_deref() {
        Some(role) => {
            info!("Assuming role {role} for the key audit");
            let provider = AssumeRoleProvider::builder(role.to_string())
                .session_name("keywarden")
                .configure(&base_config)
                .build()
                .await;
            base_config
                .into_builder()
                .credentials_provider(SharedCredentialsProvider::new(provider))
                .build()
        }
        None => base_config,
    };

    let Some(provider) = config.credentials_provider() else {
        bail!("No AWS credentials provider is configured");
    };
    provider
        .provide_credentials()
        .await
        .context("No AWS credentials could be resolved from the environment")?;

    debug!(
        "Loaded AWS configuration (region = {})",
        config.region().map(|r| r.as_ref()).unwrap_or("unset")
    );
    Ok(config)
}
