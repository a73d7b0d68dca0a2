//! Order/activity vocabulary and the pure decisions of the event state
//! machine. Everything here is side-effect free; the handlers in
//! `application::indexer` own the database writes.

use rust_decimal::Decimal;

use crate::domain::events::{format_address, format_order_id, MatchEvent};

pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Marketplace discriminator recorded on orders and activities. Only the
/// in-house orderbook is indexed here.
pub const MARKET_ORDER_BOOK: i32 = 1;

/// List = selling, Bid = buying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    List,
    Bid,
}

impl TryFrom<u8> for Side {
    type Error = crate::domain::events::DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Side::List),
            1 => Ok(Side::Bid),
            other => Err(crate::domain::events::DecodeError::InvalidSide(other)),
        }
    }
}

/// Bid scope: a whole collection or one specific item. Fixed-price
/// listings carry `FixForItem` on the sell side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleKind {
    FixForCollection,
    FixForItem,
}

impl TryFrom<u8> for SaleKind {
    type Error = crate::domain::events::DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SaleKind::FixForCollection),
            1 => Ok(SaleKind::FixForItem),
            other => Err(crate::domain::events::DecodeError::InvalidSaleKind(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum OrderKind {
    Listing = 1,
    ItemBid = 2,
    CollectionBid = 3,
}

impl OrderKind {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(OrderKind::Listing),
            2 => Some(OrderKind::ItemBid),
            3 => Some(OrderKind::CollectionBid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum OrderStatus {
    Active = 0,
    Filled = 1,
    Cancelled = 2,
    Expired = 3,
}

impl OrderStatus {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Activity log row types. The numeric values are part of the persisted
/// schema and the API event-type mapping; never renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ActivityKind {
    Listing = 1,
    Sale = 2,
    Transfer = 3,
    Mint = 4,
    CancelListing = 5,
    ItemBid = 6,
    CollectionBid = 7,
    CancelItemBid = 8,
    CancelCollectionBid = 9,
    MakeOffer = 10,
    CancelOffer = 11,
    Buy = 12,
}

impl ActivityKind {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(ActivityKind::Listing),
            2 => Some(ActivityKind::Sale),
            3 => Some(ActivityKind::Transfer),
            4 => Some(ActivityKind::Mint),
            5 => Some(ActivityKind::CancelListing),
            6 => Some(ActivityKind::ItemBid),
            7 => Some(ActivityKind::CollectionBid),
            8 => Some(ActivityKind::CancelItemBid),
            9 => Some(ActivityKind::CancelCollectionBid),
            10 => Some(ActivityKind::MakeOffer),
            11 => Some(ActivityKind::CancelOffer),
            12 => Some(ActivityKind::Buy),
            _ => None,
        }
    }
}

/// Order type from the Make topics: side=List is always a Listing,
/// side=Bid splits on the bid scope.
pub fn order_kind_for(side: Side, sale_kind: SaleKind) -> OrderKind {
    match (side, sale_kind) {
        (Side::List, _) => OrderKind::Listing,
        (Side::Bid, SaleKind::FixForCollection) => OrderKind::CollectionBid,
        (Side::Bid, SaleKind::FixForItem) => OrderKind::ItemBid,
    }
}

/// Activity row type appended for a Make event.
pub fn make_activity_kind(side: Side, sale_kind: SaleKind) -> ActivityKind {
    match (side, sale_kind) {
        (Side::List, _) => ActivityKind::Listing,
        (Side::Bid, SaleKind::FixForCollection) => ActivityKind::CollectionBid,
        (Side::Bid, SaleKind::FixForItem) => ActivityKind::ItemBid,
    }
}

/// Activity row type appended when an order is cancelled, keyed off the
/// cancelled order's own type.
pub fn cancel_activity_kind(kind: OrderKind) -> ActivityKind {
    match kind {
        OrderKind::Listing => ActivityKind::CancelListing,
        OrderKind::CollectionBid => ActivityKind::CancelCollectionBid,
        OrderKind::ItemBid => ActivityKind::CancelItemBid,
    }
}

/// Both trade directions of a LogMatch, resolved to marketplace roles.
///
/// The maker order is the standing one; whichever side carries `List`
/// provided the NFT and is the sell order, the other is the buy order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRoles {
    /// Lowercased address the item now belongs to.
    pub new_owner: String,
    pub collection: String,
    pub token_id: String,
    /// Seller, i.e. the sell order's maker.
    pub from: String,
    /// Buyer, i.e. the buy order's maker.
    pub to: String,
    pub sell_order_id: String,
    pub buy_order_id: String,
}

pub fn derive_match_roles(event: &MatchEvent) -> MatchRoles {
    let make_order_id = format_order_id(&event.make_order_key);
    let take_order_id = format_order_id(&event.take_order_key);

    if event.make_order.side == Side::Bid {
        // Standing bid hit by a seller: the take order carries the NFT.
        MatchRoles {
            new_owner: format_address(&event.make_order.maker),
            collection: format_address(&event.take_order.collection),
            token_id: event.take_order.token_id.to_string(),
            from: format_address(&event.take_order.maker),
            to: format_address(&event.make_order.maker),
            sell_order_id: take_order_id,
            buy_order_id: make_order_id,
        }
    } else {
        // Standing listing bought outright: the make order carries the NFT.
        MatchRoles {
            new_owner: format_address(&event.take_order.maker),
            collection: format_address(&event.make_order.collection),
            token_id: event.make_order.token_id.to_string(),
            from: format_address(&event.make_order.maker),
            to: format_address(&event.take_order.maker),
            sell_order_id: make_order_id,
            buy_order_id: take_order_id,
        }
    }
}

/// What a match does to the buy-side order's remaining quantity.
/// The sell side always goes Filled; only the buy side partial-fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialFillStep {
    /// `quantity_remaining > 1`: decrement and stay Active.
    Decrement { new_remaining: i64 },
    /// `quantity_remaining <= 1`: mark Filled with zero remaining.
    Fill,
}

pub fn partial_fill_step(quantity_remaining: i64) -> PartialFillStep {
    if quantity_remaining > 1 {
        PartialFillStep::Decrement {
            new_remaining: quantity_remaining - 1,
        }
    } else {
        PartialFillStep::Fill
    }
}

/// Exact-decimal rendering of a wei amount. `None` only when the value
/// exceeds Decimal's 96-bit mantissa, which no realistic price reaches;
/// callers treat that as a decode failure and skip the log.
pub fn wei_to_decimal(wei: u128) -> Option<Decimal> {
    let signed = i128::try_from(wei).ok()?;
    Decimal::try_from_i128_with_scale(signed, 0).ok()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, B256, U256};

    use super::*;
    use crate::domain::events::OrderView;

    fn view(side: Side, maker: &str) -> OrderView {
        OrderView {
            side,
            sale_kind: SaleKind::FixForItem,
            maker: maker.parse().unwrap(),
            token_id: U256::from(7u64),
            collection: address!("cccc000000000000000000000000000000000ccc"),
            amount: 1,
            price: 1_000_000_000_000_000_000,
            expiry: 2_000_000_000,
            salt: 1,
        }
    }

    fn match_event(make_side: Side) -> MatchEvent {
        let (make_maker, take_maker) = (
            "0xAAA0000000000000000000000000000000000aaa",
            "0xBBB0000000000000000000000000000000000bbb",
        );
        MatchEvent {
            make_order_key: B256::repeat_byte(0x01),
            take_order_key: B256::repeat_byte(0x02),
            make_order: view(make_side, make_maker),
            take_order: view(
                match make_side {
                    Side::List => Side::Bid,
                    Side::Bid => Side::List,
                },
                take_maker,
            ),
            fill_price: 1_000_000_000_000_000_000,
        }
    }

    #[test]
    fn order_kind_derivation() {
        assert_eq!(
            order_kind_for(Side::List, SaleKind::FixForItem),
            OrderKind::Listing
        );
        assert_eq!(
            order_kind_for(Side::List, SaleKind::FixForCollection),
            OrderKind::Listing
        );
        assert_eq!(
            order_kind_for(Side::Bid, SaleKind::FixForCollection),
            OrderKind::CollectionBid
        );
        assert_eq!(
            order_kind_for(Side::Bid, SaleKind::FixForItem),
            OrderKind::ItemBid
        );
    }

    #[test]
    fn cancel_kind_mapping() {
        assert_eq!(
            cancel_activity_kind(OrderKind::Listing),
            ActivityKind::CancelListing
        );
        assert_eq!(
            cancel_activity_kind(OrderKind::CollectionBid),
            ActivityKind::CancelCollectionBid
        );
        assert_eq!(
            cancel_activity_kind(OrderKind::ItemBid),
            ActivityKind::CancelItemBid
        );
    }

    #[test]
    fn match_roles_when_listing_is_standing() {
        let roles = derive_match_roles(&match_event(Side::List));
        // Buy-now: make order sells, take order buys.
        assert_eq!(roles.from, "0xaaa0000000000000000000000000000000000aaa");
        assert_eq!(roles.to, "0xbbb0000000000000000000000000000000000bbb");
        assert_eq!(roles.new_owner, roles.to);
        assert_eq!(
            roles.sell_order_id,
            format!("0x{}", "01".repeat(32))
        );
        assert_eq!(roles.buy_order_id, format!("0x{}", "02".repeat(32)));
        assert_eq!(roles.token_id, "7");
    }

    #[test]
    fn match_roles_when_bid_is_standing() {
        let roles = derive_match_roles(&match_event(Side::Bid));
        // Accept-offer: take order sells, make order buys.
        assert_eq!(roles.from, "0xbbb0000000000000000000000000000000000bbb");
        assert_eq!(roles.to, "0xaaa0000000000000000000000000000000000aaa");
        assert_eq!(roles.new_owner, roles.to);
        assert_eq!(roles.sell_order_id, format!("0x{}", "02".repeat(32)));
        assert_eq!(roles.buy_order_id, format!("0x{}", "01".repeat(32)));
    }

    #[test]
    fn partial_fill_sequence_for_size_three() {
        // S4: a collection bid of size 3 filled by three matches.
        assert_eq!(
            partial_fill_step(3),
            PartialFillStep::Decrement { new_remaining: 2 }
        );
        assert_eq!(
            partial_fill_step(2),
            PartialFillStep::Decrement { new_remaining: 1 }
        );
        assert_eq!(partial_fill_step(1), PartialFillStep::Fill);
    }

    #[test]
    fn single_unit_order_fills_immediately() {
        assert_eq!(partial_fill_step(1), PartialFillStep::Fill);
        assert_eq!(partial_fill_step(0), PartialFillStep::Fill);
    }

    #[test]
    fn wei_conversion_is_exact_for_realistic_prices() {
        assert_eq!(
            wei_to_decimal(10_000_000_000_000_000).unwrap().to_string(),
            "10000000000000000"
        );
        // 1M ETH in wei still fits the mantissa.
        let large = 1_000_000u128 * 1_000_000_000_000_000_000u128;
        assert_eq!(wei_to_decimal(large).unwrap().to_string(), large.to_string());
        assert!(wei_to_decimal(u128::MAX).is_none());
    }

    #[test]
    fn activity_kind_values_are_stable() {
        assert_eq!(ActivityKind::Listing.as_i32(), 1);
        assert_eq!(ActivityKind::Sale.as_i32(), 2);
        assert_eq!(ActivityKind::CancelListing.as_i32(), 5);
        assert_eq!(ActivityKind::CancelCollectionBid.as_i32(), 9);
        assert_eq!(ActivityKind::from_i32(2), Some(ActivityKind::Sale));
        assert_eq!(ActivityKind::from_i32(99), None);
    }
}
