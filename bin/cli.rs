//! CLI tool for deploying and interacting with the lending platform contract.

use odra::casper_types::{U256, U512};
use odra::host::{HostEnv, HostRef};
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};
use wraith_lending::loan_registry::LoanRegistry;

/// Platform fee applied at deployment (1%)
const DEFAULT_PLATFORM_FEE_BPS: u64 = 100;

/// Deploys the Loan Registry contract.
pub struct LoanRegistryDeployScript;

impl DeployScript for LoanRegistryDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        use wraith_lending::loan_registry::LoanRegistryInitArgs;

        let _registry = LoanRegistry::load_or_deploy(
            &env,
            LoanRegistryInitArgs {
                platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
            },
            container,
            500_000_000_000, // Gas limit for registry deployment
        )?;

        Ok(())
    }
}

/// Scenario to request a native-asset loan backed by native collateral.
pub struct CreateLoanScenario;

impl Scenario for CreateLoanScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new(
                "principal",
                "Requested principal in motes",
                NamedCLType::U256,
            ),
            CommandArg::new(
                "collateral",
                "Native collateral to lock, in motes",
                NamedCLType::U512,
            ),
            CommandArg::new(
                "max_rate_bps",
                "Highest dynamic rate to accept, in basis points",
                NamedCLType::U64,
            ),
            CommandArg::new(
                "duration",
                "Loan duration in milliseconds",
                NamedCLType::U64,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args,
    ) -> Result<(), Error> {
        let registry = container.contract_ref::<LoanRegistry>(env)?;
        let principal = args.get_single::<U256>("principal")?;
        let collateral = args.get_single::<U512>("collateral")?;
        let max_rate_bps = args.get_single::<u64>("max_rate_bps")?;
        let duration = args.get_single::<u64>("duration")?;

        env.set_gas(300_000_000_000);
        let loan_id = registry
            .with_tokens(collateral)
            .try_create_loan(principal, 0, max_rate_bps, duration)?;

        println!("Loan #{} created, waiting for a lender", loan_id);
        Ok(())
    }
}

impl ScenarioMetadata for CreateLoanScenario {
    const NAME: &'static str = "create-loan";
    const DESCRIPTION: &'static str =
        "Requests a loan at the dynamic rate, locking native collateral";
}

/// Scenario to print the platform configuration and counters.
pub struct PlatformStatsScenario;

impl Scenario for PlatformStatsScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args,
    ) -> Result<(), Error> {
        let registry = container.contract_ref::<LoanRegistry>(env)?;
        let stats = registry.try_get_platform_stats()?;

        println!("Total loans:            {}", stats.total_loans);
        println!("Platform fee:           {} bps", stats.platform_fee_bps);
        println!("Min collateral ratio:   {} bps", stats.min_collateral_ratio_bps);
        println!("Max loan duration:      {} ms", stats.max_loan_duration);
        println!("Base rate:              {} bps", stats.base_rate_bps);
        println!(
            "Dynamic rate window:    [{}, {}] bps",
            stats.min_dynamic_rate_bps, stats.max_dynamic_rate_bps
        );
        println!("Paused:                 {}", stats.paused);
        Ok(())
    }
}

impl ScenarioMetadata for PlatformStatsScenario {
    const NAME: &'static str = "platform-stats";
    const DESCRIPTION: &'static str = "Prints the platform configuration and loan counters";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the Casper peer-to-peer lending platform")
        // Deploy scripts
        .deploy(LoanRegistryDeployScript)
        // Contract references
        .contract::<LoanRegistry>()
        // Scenarios
        .scenario(CreateLoanScenario)
        .scenario(PlatformStatsScenario)
        .build()
        .run();
}
