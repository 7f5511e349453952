use rand::{distributions::Alphanumeric, Rng};

const TOKEN_LEN: usize = 8;

/// Random alphanumeric token identifying one driver invocation.
pub fn unique_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub fn build_name(token: &str, base: &str) -> String {
    format!("{}_{}", token, base)
}
