//! Byte-exact message for a vote account withdrawal, as dumped by the
//! `solana withdraw-from-vote-account --dump-transaction-message` CLI.

use sol_core::{Hash, Keypair, Message, Pubkey};
use sol_programs::vote_program;

const WITHDRAWER_KEYPAIR: &str = "867b1bd0e3affd630451aae7ba8db18ec58b5e069d02a3599679eb56b91601e93a85e527d447fe48f62da09c81c712bd358f6248b66a451d269177be0d699d70";

const WITHDRAW_MESSAGE: &str = "010001043a85e527d447fe48f62da09c81c712bd358f6248b66a451d269177be0d699d70ab15060ed1f96a1dd3a842968dc4e67c7929642d61e7b3492fc4b1ed0e8e966d85d8eef4a0ebf3b751e0215bbe9f249a4ab5ad2622b578369c3cf0d64710b0160761481d357474bb7c4d7624ebd3bdb3d8355e73d11043fc0da35380000000008f1ad068c4bb16399a47efa6bc5af75c4e976f33144cc254229213ad4581cc6c0103030102000c030000000094357700000000";

#[test]
fn withdraw_from_vote_account_matches_cli_message() {
    let withdrawer = Keypair::from_bytes(&hex::decode(WITHDRAWER_KEYPAIR).unwrap()).unwrap();
    let vote: Pubkey = "CWqJy1JpmBcx7awpeANfrPk6AsQKkmego8ujjaYPGFEk".parse().unwrap();
    let to: Pubkey = "A1V5gsis39WY42djdTKUFsgE5oamk4nrtg16WnKTuzZK".parse().unwrap();
    let blockhash: Hash = "Add1tV7kJgNHhTtx3Dgs6dhC7kyXrGJQZ2tJGW15tLDH".parse().unwrap();

    let ix = vote_program::withdraw(&vote, &withdrawer.pubkey(), 2_000_000_000, &to);
    let message = Message::compile(&[ix], &withdrawer.pubkey(), blockhash).unwrap();

    assert_eq!(hex::encode(message.serialize().unwrap()), WITHDRAW_MESSAGE);
}
