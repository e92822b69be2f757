use clap::Args;

use crate::config::AppConfig;
use crate::seed::run_seed;

#[derive(Args, Debug)]
pub struct SeedArgs {
    #[arg(long, help = "Seed a throwaway in-memory store (dry run)")]
    pub in_memory: bool,
}

pub async fn handle(args: SeedArgs, config: AppConfig) -> anyhow::Result<()> {
    let bcrypt_cost = config.security.bcrypt_cost;
    let state = super::build_state(config, args.in_memory).await?;

    let report = run_seed(state.users.as_ref(), &state.catalog, bcrypt_cost).await?;
    println!("Seeded {} users and {} products", report.users, report.products);

    if let Some(database) = state.database {
        database.close().await;
    }
    Ok(())
}
