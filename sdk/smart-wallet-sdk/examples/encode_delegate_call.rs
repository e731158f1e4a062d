// Example: Encoding a delegate call through the smart wallet
//
// This example demonstrates how to:
// 1. Parse and validate a free-form function signature
// 2. Encode its parameters into call data
// 3. Wrap the result in the wallet's `delegateCallToContract` call
//
// Usage: cargo run --example encode_delegate_call -- <target> "<signature>" [params...]

use smart_wallet_sdk::advanced::calls;
use smart_wallet_sdk::{parse_address, FunctionSignature};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let target = args
        .next()
        .unwrap_or_else(|| "0x00000000000000000000000000000000000000d1".to_string());
    let signature = args
        .next()
        .unwrap_or_else(|| "transfer(address,uint256)".to_string());
    let mut params: Vec<String> = args.collect();
    if params.is_empty() {
        params = vec![
            "0x00000000000000000000000000000000000abc01".to_string(),
            "100".to_string(),
        ];
    }

    // 1. Validate the signature
    let target = parse_address(&target)?;
    let signature = FunctionSignature::parse(&signature)?;
    info!(canonical = %signature.canonical(), selector = %signature.selector(), "parsed signature");

    // 2. Encode the target call
    let inner = signature.encode(params.as_slice())?;
    info!(len = inner.len(), "encoded target call");

    // 3. Wrap it for the smart wallet
    let outer = calls::delegate_call_to_contract(target, inner.clone());

    println!("Target call data:  {inner}");
    println!("Wallet call data:  {outer}");

    Ok(())
}
