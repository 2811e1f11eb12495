//! Print a random hex key

use crate::error::Result;
use crate::keygen::generate_random_hex;

use super::Context;

pub fn run(ctx: &Context, length: Option<usize>) -> Result<()> {
    let key = generate_random_hex(length.unwrap_or(ctx.settings.key_length))?;
    println!("{}", key);
    Ok(())
}
