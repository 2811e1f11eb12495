//! Text encryption: base64 envelopes on stdout

use secrecy::ExposeSecret;

use crate::cipher;
use crate::crypto::OsRandom;
use crate::error::Result;

use super::{prompt_new_password, prompt_password, read_text, status, Context};

pub fn encrypt(ctx: &Context, text: Option<String>) -> Result<()> {
    let text = read_text(text, "text to encrypt")?;
    let password = prompt_new_password()?;
    let params = ctx.kdf()?;

    status("Deriving key and encrypting...");
    let sealed = cipher::seal_text_with(&text, password.expose_secret(), &params, OsRandom)?;

    println!("{}", sealed);
    Ok(())
}

pub fn decrypt(ctx: &Context, encoded: Option<String>) -> Result<()> {
    let encoded = read_text(encoded, "encrypted text")?;
    let password = prompt_password()?;
    let params = ctx.kdf()?;

    status("Deriving key and decrypting...");
    let plaintext = zeroize::Zeroizing::new(cipher::open_text_with(
        &encoded,
        password.expose_secret(),
        &params,
    )?);

    println!("{}", *plaintext);
    Ok(())
}
