use clap::Args;

use crate::aws::AwsSettings;

#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "AWS Options")]
pub struct AwsArgs {
    /// Named profile from the shared AWS config files
    #[arg(long, env = "AWS_PROFILE", value_name = "PROFILE")]
    pub profile: Option<String>,

    /// Region for the IAM and SES clients (defaults to the provider chain, then us-east-1)
    #[arg(long, env = "AWS_REGION", value_name = "REGION")]
    pub region: Option<String>,

    /// Assume this role before calling IAM and SES
    #[arg(long, value_name = "ARN")]
    pub role_arn: Option<String>,
}

impl AwsArgs {
    pub fn settings(&self) -> AwsSettings {
        AwsSettings {
            profile: self.profile.clone(),
            region: self.region.clone(),
            role_arn: self.role_arn.clone(),
        }
    }
}
