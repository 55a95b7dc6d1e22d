use std::{path::Path, str::FromStr};

use alloy::signers::local::PrivateKeySigner;
use eyre::WrapErr;

use crate::{
    chain::Account,
    constants::{BEARER_TOKEN_FILE_PATH, PRIVATE_KEYS_FILE_PATH},
};

pub fn parse_private_keys(json: &str) -> eyre::Result<Vec<Account>> {
    let keys: Vec<String> = serde_json::from_str(json)?;

    if keys.is_empty() {
        eyre::bail!("No private keys found");
    }

    keys.iter()
        .enumerate()
        .map(|(i, pk)| {
            let signer = PrivateKeySigner::from_str(pk.trim())
                .wrap_err_with(|| format!("Private key #{} is invalid", i + 1))?;
            Ok(Account::new(signer))
        })
        .collect()
}

pub fn parse_bearer_token(contents: &str) -> eyre::Result<String> {
    let token = contents.trim();

    if token.is_empty() {
        eyre::bail!("Bearer token is empty");
    }

    Ok(token.to_string())
}

pub async fn read_private_keys(path: impl AsRef<Path>) -> eyre::Result<Vec<Account>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("Cannot read private keys from {}", path.display()))?;

    parse_private_keys(&contents).wrap_err_with(|| format!("Invalid {}", path.display()))
}

pub async fn read_bearer_token(path: impl AsRef<Path>) -> eyre::Result<String> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("Cannot read bearer token from {}", path.display()))?;

    parse_bearer_token(&contents)
}

pub async fn read_default_credentials() -> eyre::Result<(Vec<Account>, String)> {
    let token = read_bearer_token(BEARER_TOKEN_FILE_PATH).await?;
    let accounts = read_private_keys(PRIVATE_KEYS_FILE_PATH).await?;

    Ok((accounts, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn parses_key_list() {
        let accounts = parse_private_keys(&format!(r#"["{KEY}", "{KEY}"]"#)).unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].address, accounts[1].address);
    }

    #[test]
    fn empty_key_list_is_fatal() {
        let err = parse_private_keys("[]").unwrap_err();
        assert!(err.to_string().contains("No private keys"));
    }

    #[test]
    fn malformed_key_is_reported_by_position() {
        let err = parse_private_keys(&format!(r#"["{KEY}", "nope"]"#)).unwrap_err();
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn token_is_trimmed() {
        assert_eq!(parse_bearer_token("  abc.def\n").unwrap(), "abc.def");
        assert!(parse_bearer_token("\n").is_err());
    }

    #[tokio::test]
    async fn missing_token_file_is_an_error() {
        assert!(read_bearer_token("does/not/exist.txt").await.is_err());
    }
}
