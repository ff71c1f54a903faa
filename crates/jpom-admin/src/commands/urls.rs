// ABOUTME: Implementation of 'jpom-admin url' commands
// ABOUTME: Prints direct download and websocket URLs for the configured server

use anyhow::{bail, Result};

use jpom_client::{urls, ClientConfig};

use super::UrlCommand;

pub fn run(config: &ClientConfig, cmd: UrlCommand) -> Result<()> {
    match cmd {
        UrlCommand::Download { path, params } => {
            let params = parse_params(&params)?;
            println!("{}", urls::download_url(config, &path, &params));
        }
        UrlCommand::Websocket { path, query } => {
            println!("{}", urls::websocket_url(config, &path, &query)?);
        }
    }
    Ok(())
}

fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|p| match p.split_once('=') {
            Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
            _ => bail!("Invalid parameter '{}', expected key=value", p),
        })
        .collect()
}
