use alkahest_sdk::{AlkahestClient, arbiters::Demand};
use colored::Colorize;

use crate::args::AttestationCommands;

pub(crate) async fn run(
    client: &AlkahestClient,
    command: AttestationCommands,
) -> anyhow::Result<()> {
    match command {
        AttestationCommands::Show { uid } => {
            let (attestation, obligation) = client.get_obligation(uid).await?;
            let valid = client.is_attestation_valid(uid).await?;

            println!("\n{}\n", format!("**** Attestation {}", uid).bright_blue());
            println!("{attestation}");
            println!(
                "valid:      {}",
                if valid { "yes".green() } else { "no".red() }
            );
            println!("obligation: {}", obligation.to_string().cyan());
            if let Some((arbiter, data)) = obligation.arbiter_and_demand() {
                match Demand::decode(client.addresses(), arbiter, data) {
                    Ok(demand) => println!("demand:     {}", demand.to_string().cyan()),
                    Err(err) => println!("demand:     {}", format!("undecodable: {err}").red()),
                }
            }
            println!();
        },
    }
    Ok(())
}
