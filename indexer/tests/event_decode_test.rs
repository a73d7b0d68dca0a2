//! End-to-end decode of a listing-then-sale log sequence, the way the
//! sync loop sees it come back from eth_getLogs.

use alloy_primitives::{address, b256, hex, B256, U256};
use alloy_sol_types::SolEvent;

use openmart_sync::application::indexer::next_batch_range;
use openmart_sync::domain::events::{
    decode_log, format_order_id, Asset, LogMatch, OrderBookEvent, OrderDetail, RawLog,
    LOG_MAKE_TOPIC, LOG_MATCH_TOPIC,
};
use openmart_sync::domain::orders::{derive_match_roles, partial_fill_step, PartialFillStep, Side};

const COLLECTION: &str = "e7f1725e7734ce288f8367e1bb143e90bb3f0512";

fn make_log_at(block: u64, tx: u8) -> RawLog {
    let data = hex::decode(concat!(
        "c773ae81bc9a186dc6c5d70a486730a6f734578ae1a0116acd0aaaf69250d265",
        "0000000000000000000000000000000000000000000000000000000000000007",
        "000000000000000000000000e7f1725e7734ce288f8367e1bb143e90bb3f0512",
        "0000000000000000000000000000000000000000000000000000000000000001",
        "0000000000000000000000000000000000000000000000000de0b6b3a7640000",
        "000000000000000000000000000000000000000000000000000000006558875d",
        "0000000000000000000000000000000000000000000000000000000000000001",
    ))
    .unwrap();

    RawLog {
        address: address!("7d29d1860bd4d3a74bbd9a03c9b043d375311dcb"),
        topics: vec![
            LOG_MAKE_TOPIC,
            // side = List, saleKind = FixForItem, maker
            b256!("0000000000000000000000000000000000000000000000000000000000000000"),
            b256!("0000000000000000000000000000000000000000000000000000000000000001"),
            b256!("000000000000000000000000aaa0000000000000000000000000000000000aaa"),
        ],
        data,
        block_number: block,
        tx_hash: B256::repeat_byte(tx),
        log_index: 0,
    }
}

fn match_log_at(block: u64, tx: u8) -> RawLog {
    let nft = Asset {
        tokenId: U256::from(7u64),
        collection: COLLECTION.parse().unwrap(),
        amount: alloy_primitives::aliases::U96::from(1u64),
    };
    let event = LogMatch {
        makeOrderKey: b256!("c773ae81bc9a186dc6c5d70a486730a6f734578ae1a0116acd0aaaf69250d265"),
        takeOrderKey: B256::repeat_byte(0x02),
        makeOrder: OrderDetail {
            side: 0,
            saleKind: 1,
            maker: address!("aaa0000000000000000000000000000000000aaa"),
            nft: nft.clone(),
            price: 1_000_000_000_000_000_000,
            expiry: 0x6558875d,
            salt: 1,
        },
        takeOrder: OrderDetail {
            side: 1,
            saleKind: 1,
            maker: address!("bbb0000000000000000000000000000000000bbb"),
            nft,
            price: 1_000_000_000_000_000_000,
            expiry: 0x6558875d,
            salt: 2,
        },
        fillPrice: 1_000_000_000_000_000_000,
    };

    RawLog {
        address: address!("7d29d1860bd4d3a74bbd9a03c9b043d375311dcb"),
        topics: vec![
            LOG_MATCH_TOPIC,
            b256!("c773ae81bc9a186dc6c5d70a486730a6f734578ae1a0116acd0aaaf69250d265"),
            B256::repeat_byte(0x02),
        ],
        data: event.encode_data(),
        block_number: block,
        tx_hash: B256::repeat_byte(tx),
        log_index: 1,
    }
}

#[test]
fn listing_then_sale_decodes_in_chain_order() {
    let logs = vec![make_log_at(100, 0x0a), match_log_at(110, 0x0b)];

    let make = match decode_log(&logs[0]).unwrap().unwrap() {
        OrderBookEvent::Make(event) => event,
        other => panic!("expected Make, got {other:?}"),
    };
    assert_eq!(make.side, Side::List);
    assert_eq!(make.token_id, U256::from(7u64));
    assert_eq!(make.price, 1_000_000_000_000_000_000);
    assert_eq!(
        format_order_id(&make.order_key),
        "0xc773ae81bc9a186dc6c5d70a486730a6f734578ae1a0116acd0aaaf69250d265"
    );

    let matched = match decode_log(&logs[1]).unwrap().unwrap() {
        OrderBookEvent::Match(event) => event,
        other => panic!("expected Match, got {other:?}"),
    };
    assert_eq!(matched.make_order_key, make.order_key);

    // The sale resolves to: seller 0xaaa…, buyer 0xbbb…, the listing is
    // the sell order, and the buyer becomes the owner.
    let roles = derive_match_roles(&matched);
    assert_eq!(roles.from, "0xaaa0000000000000000000000000000000000aaa");
    assert_eq!(roles.to, "0xbbb0000000000000000000000000000000000bbb");
    assert_eq!(roles.new_owner, roles.to);
    assert_eq!(roles.sell_order_id, format_order_id(&make.order_key));
    assert_eq!(roles.token_id, "7");

    // The one-unit listing fills on its first match.
    assert_eq!(partial_fill_step(make.amount), PartialFillStep::Fill);
}

#[test]
fn a_reorged_match_is_the_same_event_at_a_new_height() {
    let orig = match_log_at(110, 0x0b);
    let moved = match_log_at(111, 0x0b);

    assert_eq!(orig.tx_hash, moved.tx_hash);
    assert_ne!(orig.block_number, moved.block_number);

    // Both positions decode to identical payloads, which is what lets the
    // reorg guard delete and re-apply without drift.
    let a = decode_log(&orig).unwrap().unwrap();
    let b = decode_log(&moved).unwrap().unwrap();
    assert_eq!(a, b);
}

#[test]
fn crash_recovery_rescans_the_same_inclusive_range() {
    // Cursor not advanced after a crash mid-batch: the restart computes
    // the identical range and replays it.
    let first = next_batch_range(100, 250, 8, 100);
    let replay = next_batch_range(100, 260, 8, 100);
    assert_eq!(first, Some((100, 200)));
    assert_eq!(replay, Some((100, 200)));
}
