mod common;

use prost::Message;

use common::*;
use xroute_core::proto::{single_mode, AuthInfo, TxRaw, SIGN_MODE_DIRECT};
use xroute_core::signing::{sign_cosmos_message, tx_hash, SigningRequest};
use xroute_core::{Coin, CosmosMessage, Fee, Operation, SignerData, SigningStrategy};

fn hub_message() -> CosmosMessage {
    match transfer_op(HUB, "memo-1") {
        Operation::MultiChainMsg(op) => CosmosMessage::from_operation(&op).expect("message"),
        Operation::EvmTx(_) => unreachable!(),
    }
}

fn signer_data() -> SignerData {
    SignerData {
        account_number: 12,
        sequence: 3,
        chain_id: HUB.to_owned(),
    }
}

#[tokio::test]
async fn direct_signing_uses_strategy_pubkey_and_hashes_envelope() {
    let journal = Journal::default();
    let signer = direct_signer(&journal, &[HUB]);
    let message = hub_message();
    let fee = Fee::new(Coin::new(5_000, "uatom"), 200_000);
    let data = signer_data();

    let signed = sign_cosmos_message(
        &signer,
        SigningRequest {
            message: &message,
            fee: &fee,
            signer_data: &data,
            signer_address: &address_for(HUB),
            strategy: SigningStrategy::Ethermint,
            timeout_height: 0,
        },
    )
    .await
    .expect("signed");

    assert_eq!(signed.tx_hash, tx_hash(&signed.tx_bytes));
    assert!(signed.tx_hash.chars().all(|c| !c.is_ascii_lowercase()));

    let raw = TxRaw::decode(signed.tx_bytes.as_slice()).expect("raw");
    let auth = AuthInfo::decode(raw.auth_info_bytes.as_slice()).expect("auth");
    let info = &auth.signer_infos[0];
    assert_eq!(info.sequence, 3);
    assert_eq!(
        info.public_key.as_ref().map(|k| k.type_url.as_str()),
        Some("/ethermint.crypto.v1.ethsecp256k1.PubKey")
    );
    assert_eq!(info.mode_info, Some(single_mode(SIGN_MODE_DIRECT)));
    assert_eq!(entries(&journal), vec!["sign_direct:cosmoshub-4".to_owned()]);
}

#[tokio::test]
async fn amino_doc_carries_numbers_as_strings() {
    let journal = Journal::default();
    let (signer, amino) = amino_signer(&journal, &[HUB]);
    let message = hub_message();
    let fee = Fee::new(Coin::new(5_000, "uatom"), 200_000);
    let data = signer_data();

    sign_cosmos_message(
        &signer,
        SigningRequest {
            message: &message,
            fee: &fee,
            signer_data: &data,
            signer_address: &address_for(HUB),
            strategy: SigningStrategy::Standard,
            timeout_height: 0,
        },
    )
    .await
    .expect("signed");

    let docs = amino.docs.lock().expect("docs");
    let doc = &docs[0];
    assert_eq!(doc.account_number, "12");
    assert_eq!(doc.sequence, "3");
    assert_eq!(doc.fee.gas, "200000");
    assert_eq!(doc.timeout_height, None);
    assert_eq!(doc.msgs[0].type_, "cosmos-sdk/MsgTransfer");
    assert_eq!(doc.msgs[0].value["memo"], "memo-1");
    assert_eq!(count(&journal, "sign_direct:"), 0);
}

#[tokio::test]
async fn unknown_signer_account_is_rejected_before_signing() {
    let journal = Journal::default();
    let signer = direct_signer(&journal, &[OSMOSIS]);
    let message = hub_message();
    let fee = Fee::new(Coin::new(5_000, "uatom"), 200_000);
    let data = signer_data();

    let err = sign_cosmos_message(
        &signer,
        SigningRequest {
            message: &message,
            fee: &fee,
            signer_data: &data,
            signer_address: &address_for(HUB),
            strategy: SigningStrategy::Standard,
            timeout_height: 0,
        },
    )
    .await
    .expect_err("missing account");
    assert_eq!(err.to_string(), "failed to retrieve account cosmos1user from signer");
    assert!(entries(&journal).is_empty());
}
