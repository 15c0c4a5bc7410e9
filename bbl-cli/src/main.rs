//! The bbl command line
//!
//! Parses global flags, loads the state file, wires the collaborators, and
//! dispatches to the selected command. The state the command returns is
//! persisted on success and on failure alike; a completed destroy is the
//! one path that erases the state file instead.

use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use colored::Colorize;

use bbl_aws::{
    AwsClients, AwsCredentialValidator, CloudFormationManager, Ec2AvailabilityZoneRetriever,
    Ec2KeyPairDeleter, Ec2KeyPairSynchronizer, IamCertificateManager, PemCertificateValidator,
};
use bbl_bosh::{
    BoshCloudConfigManager, BoshCloudConfigurator, BoshDirectorClientProvider, BoshInitDeployer,
    BoshInitRunner,
};
use bbl_core::commands::{
    CreateLbs, CreateLbsArgs, DeleteLbs, Destroy, DestroyArgs, Lbs, StateProperty, StateQuery,
    Stdout, Up, UpdateLbs, UpdateLbsArgs, Version,
};
use bbl_core::{ExecuteResult, Logger};
use bbl_state::{State, Store};

#[derive(Parser)]
#[command(name = "bbl", version)]
#[command(about = "Stands up a BOSH director and its supporting infrastructure on AWS")]
struct Cli {
    /// AWS access key ID (overrides the stored credentials)
    #[arg(long, global = true, env = "BBL_AWS_ACCESS_KEY_ID")]
    aws_access_key_id: Option<String>,

    /// AWS secret access key (overrides the stored credentials)
    #[arg(long, global = true, env = "BBL_AWS_SECRET_ACCESS_KEY")]
    aws_secret_access_key: Option<String>,

    /// AWS region (overrides the stored region)
    #[arg(long, global = true, env = "BBL_AWS_REGION")]
    aws_region: Option<String>,

    /// Directory holding bbl-state.json
    #[arg(long, global = true, default_value = ".")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the BOSH director and its infrastructure
    Up,
    /// Tear down everything bbl created
    Destroy {
        /// Skip the confirmation prompt
        #[arg(long)]
        no_confirm: bool,
    },
    /// Attach a load balancer to the environment
    CreateLbs {
        /// Load balancer variant: cf or concourse
        #[arg(long = "type")]
        lb_type: String,
        /// Path to the TLS certificate
        #[arg(long)]
        cert: PathBuf,
        /// Path to the TLS private key
        #[arg(long)]
        key: PathBuf,
        /// Path to the certificate chain
        #[arg(long)]
        chain: Option<PathBuf>,
        /// Succeed without touching anything when a load balancer exists
        #[arg(long)]
        skip_if_exists: bool,
    },
    /// Rotate the certificate on the attached load balancer
    UpdateLbs {
        /// Path to the new TLS certificate
        #[arg(long)]
        cert: PathBuf,
        /// Path to the new TLS private key
        #[arg(long)]
        key: PathBuf,
        /// Path to the certificate chain
        #[arg(long)]
        chain: Option<PathBuf>,
    },
    /// Detach the load balancer from the environment
    DeleteLbs,
    /// Show the attached load balancers
    Lbs,
    /// Print the BOSH director address
    DirectorAddress,
    /// Print the BOSH director username
    DirectorUsername,
    /// Print the BOSH director password
    DirectorPassword,
    /// Print the SSH private key
    SshKey,
    /// Print the bbl version
    Version,
}

/// Renders command progress on the terminal and asks for confirmations
struct TerminalLogger;

impl Logger for TerminalLogger {
    fn step(&self, message: &str) {
        println!("{} {}", "step:".cyan(), message);
    }

    fn println(&self, message: &str) {
        println!("{}", message);
    }

    fn prompt(&self, message: &str) -> bool {
        println!("{}", message.yellow().bold());
        print!("Type 'yes' to confirm: ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        input.trim().eq_ignore_ascii_case("yes")
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(message) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), message);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let store = Store::new(&cli.state_dir);
    let mut state = store.load().map_err(|e| e.to_string())?;

    // command line credentials overwrite the stored ones before dispatch
    if let Some(access_key_id) = cli.aws_access_key_id {
        state.aws.access_key_id = access_key_id;
    }
    if let Some(secret_access_key) = cli.aws_secret_access_key {
        state.aws.secret_access_key = secret_access_key;
    }
    if let Some(region) = cli.aws_region {
        state.aws.region = region;
    }

    let logger: Arc<dyn Logger> = Arc::new(TerminalLogger);
    let stdout: Stdout = Arc::new(Mutex::new(io::stdout()));

    let aws = AwsClients::new(
        &state.aws.access_key_id,
        &state.aws.secret_access_key,
        &state.aws.region,
    )
    .await;
    let credential_validator = Arc::new(AwsCredentialValidator::new(&state.aws));
    let infrastructure_manager = Arc::new(CloudFormationManager::new(aws.cloudformation.clone()));
    let certificate_manager = Arc::new(IamCertificateManager::new(aws.iam.clone()));
    let availability_zone_retriever = Arc::new(Ec2AvailabilityZoneRetriever::new(aws.ec2.clone()));
    let key_pair_synchronizer = Arc::new(Ec2KeyPairSynchronizer::new(aws.ec2.clone()));
    let key_pair_deleter = Arc::new(Ec2KeyPairDeleter::new(aws.ec2.clone()));
    let certificate_validator = Arc::new(PemCertificateValidator::new());
    let bosh_client_provider = Arc::new(BoshDirectorClientProvider::new());
    let cloud_configurator = Arc::new(BoshCloudConfigurator::new());
    let cloud_config_manager = Arc::new(BoshCloudConfigManager::new());
    let bosh_deployer = Arc::new(BoshInitDeployer::new(
        logger.clone(),
        BoshInitRunner::new(&cli.state_dir, logger.clone()),
    ));

    let is_destroy = matches!(&cli.command, Commands::Destroy { .. });

    let result: ExecuteResult = match cli.command {
        Commands::Up => {
            Up::new(
                logger.clone(),
                credential_validator.clone(),
                key_pair_synchronizer,
                availability_zone_retriever.clone(),
                certificate_manager.clone(),
                infrastructure_manager.clone(),
                bosh_deployer.clone(),
                bosh_client_provider.clone(),
                cloud_configurator.clone(),
                cloud_config_manager.clone(),
            )
            .execute(state)
            .await
        }
        Commands::Destroy { no_confirm } => {
            Destroy::new(
                logger.clone(),
                credential_validator.clone(),
                infrastructure_manager.clone(),
                bosh_deployer.clone(),
                bosh_client_provider.clone(),
                key_pair_deleter,
                certificate_manager.clone(),
            )
            .execute(DestroyArgs { no_confirm }, state)
            .await
        }
        Commands::CreateLbs {
            lb_type,
            cert,
            key,
            chain,
            skip_if_exists,
        } => {
            CreateLbs::new(
                logger.clone(),
                credential_validator.clone(),
                certificate_manager.clone(),
                infrastructure_manager.clone(),
                availability_zone_retriever.clone(),
                bosh_client_provider.clone(),
                cloud_configurator.clone(),
                cloud_config_manager.clone(),
                certificate_validator.clone(),
            )
            .execute(
                CreateLbsArgs {
                    lb_type,
                    cert,
                    key,
                    chain,
                    skip_if_exists,
                },
                state,
            )
            .await
        }
        Commands::UpdateLbs { cert, key, chain } => {
            UpdateLbs::new(
                logger.clone(),
                credential_validator.clone(),
                certificate_manager.clone(),
                infrastructure_manager.clone(),
                availability_zone_retriever.clone(),
                bosh_client_provider.clone(),
                certificate_validator.clone(),
            )
            .execute(UpdateLbsArgs { cert, key, chain }, state)
            .await
        }
        Commands::DeleteLbs => {
            DeleteLbs::new(
                logger.clone(),
                credential_validator.clone(),
                certificate_manager.clone(),
                infrastructure_manager.clone(),
                availability_zone_retriever.clone(),
                bosh_client_provider.clone(),
                cloud_configurator.clone(),
                cloud_config_manager.clone(),
            )
            .execute(state)
            .await
        }
        Commands::Lbs => {
            Lbs::new(
                credential_validator.clone(),
                infrastructure_manager.clone(),
                stdout.clone(),
            )
            .execute(state)
            .await
        }
        Commands::DirectorAddress => {
            StateQuery::new(stdout.clone(), StateProperty::DirectorAddress)
                .execute(state)
                .await
        }
        Commands::DirectorUsername => {
            StateQuery::new(stdout.clone(), StateProperty::DirectorUsername)
                .execute(state)
                .await
        }
        Commands::DirectorPassword => {
            StateQuery::new(stdout.clone(), StateProperty::DirectorPassword)
                .execute(state)
                .await
        }
        Commands::SshKey => {
            StateQuery::new(stdout.clone(), StateProperty::SshKey)
                .execute(state)
                .await
        }
        Commands::Version => Version::new(stdout.clone()).execute(state).await,
    };

    match result {
        Ok(new_state) => {
            if is_destroy && new_state == State::new() {
                store.delete().map_err(|e| e.to_string())?;
            } else {
                store.save(&new_state).map_err(|e| e.to_string())?;
            }
            Ok(())
        }
        Err(failure) => {
            // partial progress must survive the failed command
            if let Err(save_error) = store.save(&failure.state) {
                tracing::warn!("failed to persist state after error: {}", save_error);
            }
            Err(failure.source.to_string())
        }
    }
}
