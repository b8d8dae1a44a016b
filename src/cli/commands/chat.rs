use anyhow::Result;

use super::build_engine;
use crate::chat::{ChatSession, SessionConfig};
use crate::cli::GlobalArgs;
use crate::translation::Lang;

pub async fn run_chat(to: Lang, from: Lang, global: &GlobalArgs) -> Result<()> {
    let engine = build_engine(global, false)?;
    let mut session = ChatSession::new(engine, SessionConfig { to, from });
    session.run().await
}
