//! What the binaries print to the terminal

use buckup_core::{CallerIdentity, ProvisionOutcome, ProvisionRequest, Region};

const BANNER: &str = r"
       _                _
      | |              | |
      | |__  _   _  ___| | ___   _ _ __
      | '_ \| | | |/ __| |/ / | | | '_ \
      | |_) | |_| | (__|   <| |_| | |_) |
      |_.__/ \__,_|\___|_|\_\__,_| .__/
                                 | |
                                 |_|
";

pub fn print_banner() {
    println!("{BANNER}");
    println!("Queries: {}\n", env!("CARGO_PKG_REPOSITORY"));
    println!(
        "We are going to create an S3 bucket with a user that is ready to use. In the end\n\
         you will have a bucket name, access key and secret key."
    );
}

pub fn print_separator() {
    println!();
    println!("{}", "=".repeat(80));
    println!();
}

pub fn print_credentials_help() {
    eprintln!("Credentials not set. Please make sure your AWS credentials are accessible.");
    eprintln!(
        "You can use \"aws configure\" command or set them using environment variables\n\
         \"AWS_ACCESS_KEY_ID\" and \"AWS_SECRET_ACCESS_KEY\"."
    );
    eprintln!(
        "If you have already set AWS CLI credentials for another profile, you can use\n\
         \"--profile\" flag to access them."
    );
}

pub fn account_lines(
    identity: Option<&CallerIdentity>,
    alias: Option<&str>,
    region: &Region,
) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(identity) = identity {
        lines.push(format!("Signed in as {}.", identity.arn));
    }
    if let Some(alias) = alias {
        lines.push(format!("Your account alias is \"{alias}\"."));
    }
    lines.push("Use \"--profile\" flag to use a different AWS profile.".to_string());
    lines.push(format!(
        "Region used is {region}. Use \"--region\" to specify a different region."
    ));
    lines.push("(Ctrl+c to cancel)".to_string());
    lines
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// One line per answer, shown before asking for confirmation.
pub fn summary_lines(request: &ProvisionRequest) -> Vec<String> {
    let mut lines = vec![
        format!("region: {}", request.region),
        format!("bucket_name: {}", request.bucket_name),
        format!("user_name: {}", request.user_name),
        format!("enable_versioning: {}", yes_no(request.enable_versioning)),
        format!(
            "public_get_object_paths: {}",
            list_or_none(&request.public_get_object_paths)
        ),
        format!("allow_public_acls: {}", yes_no(request.allow_public_acls)),
        format!("cors_origins: {}", list_or_none(&request.cors_origins)),
    ];
    if let Some(acl) = request.bucket_acl {
        lines.push(format!("bucket_acl: {acl}"));
    }
    if let Some(policy_name) = &request.inline_policy_name {
        lines.push(format!("policy_name: {policy_name}"));
    }
    lines
}

pub fn print_summary(request: &ProvisionRequest) {
    println!("SUMMARY:");
    for line in summary_lines(request) {
        println!("\t{line}");
    }
    println!();
}

/// Everything the caller needs to start using the bucket. Includes the secret key.
pub fn outcome_lines(outcome: &ProvisionOutcome) -> Vec<String> {
    let bucket = &outcome.bucket;
    let mut lines = vec![
        format!(
            "Created bucket \"{}\" at \"{}\" in region \"{}\".",
            bucket.name,
            bucket.location.as_deref().unwrap_or("-"),
            bucket.region
        ),
        format!("Created IAM user \"{}\" ({}).", outcome.user.name, outcome.user.arn),
    ];
    if let Some(policy_name) = &outcome.inline_policy_name {
        lines.push(format!(
            "Attached policy \"{policy_name}\" to user \"{}\".",
            outcome.user.name
        ));
    }
    if let Some(cors) = &outcome.cors {
        lines.push(format!(
            "Set CORS for domains {} to bucket \"{}\".",
            cors.allowed_origins.join(", "),
            bucket.name
        ));
    }
    if outcome.versioning_enabled {
        lines.push(format!("Enabled versioning for \"{}\".", bucket.name));
    }
    lines.push(String::new());
    lines.push(format!("\tAWS_STORAGE_BUCKET_NAME {}", bucket.name));
    lines.push(format!(
        "\tAWS_ACCESS_KEY_ID {}",
        outcome.access_key.access_key_id
    ));
    lines.push(format!(
        "\tAWS_SECRET_ACCESS_KEY {}",
        outcome.access_key.secret_access_key()
    ));
    lines
}

pub fn print_outcome(outcome: &ProvisionOutcome) {
    for line in outcome_lines(outcome) {
        println!("{line}");
    }
    print_separator();
    println!(
        "Bucket created. Please keep the above credentials secret as they grant owner\n\
         access to your bucket and to the files within it."
    );
}
