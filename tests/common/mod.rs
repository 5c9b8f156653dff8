#![allow(dead_code)]

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, B256, Bytes},
    providers::{Provider, ext::AnvilApi},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use alloy_node_bindings::{Anvil, AnvilInstance};
use reward_watcher::{
    abi::{BONDING_MANAGER, ROUNDS_MANAGER},
    test_utils::{new_round_selector, reward_selector},
};

pub fn spawn_anvil() -> anyhow::Result<AnvilInstance> {
    Ok(Anvil::new().try_spawn()?)
}

/// Runtime code that emits `LOG2(selector, calldata[0..32])` with empty data on every call.
pub fn emitter_code(selector: B256) -> Bytes {
    let mut code = vec![
        0x60, 0x00, // PUSH1 0
        0x35, // CALLDATALOAD
        0x7f, // PUSH32 selector
    ];
    code.extend_from_slice(selector.as_slice());
    code.extend_from_slice(&[
        0x60, 0x00, // PUSH1 0 (size)
        0x60, 0x00, // PUSH1 0 (offset)
        0xa2, // LOG2
        0x00, // STOP
    ]);
    code.into()
}

/// Replace both watched contracts with emitters of their events.
pub async fn install_emitters<P: Provider>(provider: &P) -> anyhow::Result<()> {
    provider.anvil_set_code(BONDING_MANAGER, emitter_code(reward_selector())).await?;
    provider.anvil_set_code(ROUNDS_MANAGER, emitter_code(new_round_selector())).await?;
    Ok(())
}

async fn emit<P: Provider>(
    provider: &P,
    from: Address,
    contract: Address,
    topic: B256,
) -> anyhow::Result<TransactionReceipt> {
    let tx = TransactionRequest::default()
        .with_from(from)
        .with_to(contract)
        .with_input(Bytes::copy_from_slice(topic.as_slice()));
    Ok(provider.send_transaction(tx).await?.get_receipt().await?)
}

pub async fn emit_new_round<P: Provider>(
    provider: &P,
    from: Address,
    round: u64,
) -> anyhow::Result<TransactionReceipt> {
    emit(provider, from, ROUNDS_MANAGER, B256::left_padding_from(&round.to_be_bytes())).await
}

pub async fn emit_reward<P: Provider>(
    provider: &P,
    from: Address,
    orchestrator: Address,
) -> anyhow::Result<TransactionReceipt> {
    emit(provider, from, BONDING_MANAGER, orchestrator.into_word()).await
}
