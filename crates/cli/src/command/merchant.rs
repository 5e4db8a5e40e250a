// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::Subcommand;
use cloverapi::models::Merchant;

use super::decode_one;
use crate::output::print_record;
use crate::session::Context;

#[derive(Debug, Subcommand)]
pub enum MerchantCommand {
    /// Show the active merchant's account.
    Get,
}

pub async fn run(ctx: &Context, cmd: &MerchantCommand, out: &mut dyn Write) -> anyhow::Result<()> {
    let client = ctx.client()?;
    match cmd {
        MerchantCommand::Get => {
            let raw = client.get("/v3/merchants/{mId}", &[]).await?;
            let m: Merchant = decode_one(&raw)?;
            print_record(
                out,
                ctx.format,
                &raw,
                &m.id,
                &[
                    ("ID", m.id.clone()),
                    ("Name", m.name.clone()),
                    ("Phone", m.phone_number.clone().unwrap_or_default()),
                    ("Website", m.website.clone().unwrap_or_default()),
                    ("Timezone", m.timezone.clone().unwrap_or_default()),
                    ("Currency", m.default_currency.clone().unwrap_or_default()),
                ],
            )?;
        }
    }
    Ok(())
}
