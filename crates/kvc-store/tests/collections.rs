//! Typed collections over a shared in-memory store, with polymorphic values
//! resolved through the codec registry.

use std::sync::Arc;

use kvc_codec::{
    implements, CodecError, ErrorKind, Interface, InterfaceRegistry, Message, Polymorphic,
    ResolveSlots, Resolver, StoreCodec, Variant,
};
use kvc_store::{pair_prefix, InMemoryKvStore, Item, KeySet, KvStore, Map, StoreError};
use serde::{Deserialize, Serialize};

trait Oracle: Variant {
    fn source(&self) -> String;
}

impl Interface for dyn Oracle {
    const NAME: &'static str = "perp.v1.Oracle";
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Chainlink {
    feed: String,
}

impl Message for Chainlink {
    const NAME: &'static str = "perp.v1.Chainlink";

    fn resolve_slots(&mut self, _resolver: &Resolver<'_>) -> Result<(), CodecError> {
        Ok(())
    }
}

impl Oracle for Chainlink {
    fn source(&self) -> String {
        format!("chainlink:{}", self.feed)
    }
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Fixed {
    price: u64,
}

impl Message for Fixed {
    const NAME: &'static str = "perp.v1.Fixed";

    fn resolve_slots(&mut self, _resolver: &Resolver<'_>) -> Result<(), CodecError> {
        Ok(())
    }
}

impl Oracle for Fixed {
    fn source(&self) -> String {
        format!("fixed:{}", self.price)
    }
}

implements!(dyn Oracle => Chainlink, Fixed);

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Market {
    ticker: String,
    oracle: Option<Polymorphic<dyn Oracle>>,
}

impl Message for Market {
    const NAME: &'static str = "perp.v1.Market";

    fn resolve_slots(&mut self, resolver: &Resolver<'_>) -> Result<(), CodecError> {
        self.oracle.resolve_slots(resolver)
    }
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Params {
    paused: bool,
    fee_bps: u32,
}

impl Message for Params {
    const NAME: &'static str = "perp.v1.Params";

    fn resolve_slots(&mut self, _resolver: &Resolver<'_>) -> Result<(), CodecError> {
        Ok(())
    }
}

struct State {
    store: Arc<InMemoryKvStore>,
    params: Item<Params>,
    markets: Map<u64, Market>,
    traders: KeySet<(String, u64)>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn state_with(registry: InterfaceRegistry) -> State {
    init_tracing();
    let store = Arc::new(InMemoryKvStore::new());
    let codec = StoreCodec::new(Arc::new(registry));
    State {
        params: Item::new(store.clone(), codec.clone(), 0, "params"),
        markets: Map::new(store.clone(), codec.clone(), 1, "markets"),
        traders: KeySet::new(store.clone(), codec, 2, "traders"),
        store,
    }
}

fn state() -> State {
    state_with(
        InterfaceRegistry::builder()
            .register_interface::<dyn Oracle>()
            .register_implementation::<dyn Oracle, Chainlink>()
            .register_implementation::<dyn Oracle, Fixed>()
            .build()
            .expect("registry"),
    )
}

fn market(ticker: &str, oracle: Option<Polymorphic<dyn Oracle>>) -> Market {
    Market {
        ticker: ticker.into(),
        oracle,
    }
}

#[test]
fn params_default_until_set() {
    let s = state();
    assert_eq!(s.params.get_or_default().unwrap(), Params::default());
    s.params
        .set(&Params {
            paused: false,
            fee_bps: 5,
        })
        .unwrap();
    assert_eq!(s.params.get_or_err().unwrap().fee_bps, 5);
}

#[test]
fn markets_resolve_oracles_on_read() {
    let s = state();
    let oracle = Polymorphic::pack(Chainlink {
        feed: "ETH/USD".into(),
    })
    .unwrap();
    s.markets.insert(&1, &market("ETH-PERP", Some(oracle))).unwrap();
    s.markets.insert(&2, &market("DOGE-PERP", None)).unwrap();

    let eth = s.markets.get_or_err(&1).unwrap();
    let slot = eth.oracle.as_ref().unwrap();
    assert!(slot.is_resolved());
    assert_eq!(slot.get().unwrap().source(), "chainlink:ETH/USD");
    assert_eq!(
        slot.downcast_ref::<Chainlink>().unwrap().feed,
        "ETH/USD".to_string()
    );

    let doge = s.markets.get(&2).unwrap().unwrap();
    assert!(doge.oracle.is_none());
}

#[test]
fn markets_iterate_in_numeric_order() {
    let s = state();
    for id in [10u64, 2, 256] {
        let oracle = Polymorphic::pack(Fixed { price: id }).unwrap();
        s.markets.insert(&id, &market("M", Some(oracle))).unwrap();
    }
    let ids: Vec<u64> = s.markets.keys().unwrap();
    assert_eq!(ids, vec![2, 10, 256]);

    let sources: Vec<String> = s
        .markets
        .iter()
        .unwrap()
        .iter()
        .map(|(_, m)| m.oracle.as_ref().unwrap().get().unwrap().source())
        .collect();
    assert_eq!(sources, vec!["fixed:2", "fixed:10", "fixed:256"]);
}

#[test]
fn unregistered_oracle_fails_whole_read() {
    let s = state();
    let oracle = Polymorphic::pack(Fixed { price: 1 }).unwrap();
    s.markets.insert(&1, &market("BTC-PERP", Some(oracle))).unwrap();

    // Same bytes read back by a node whose registry lacks `Fixed`.
    let partial = StoreCodec::new(Arc::new(
        InterfaceRegistry::builder()
            .register_interface::<dyn Oracle>()
            .register_implementation::<dyn Oracle, Chainlink>()
            .build()
            .unwrap(),
    ));
    let markets: Map<u64, Market> = Map::new(s.store.clone(), partial, 1, "markets");
    match markets.get(&1).unwrap_err() {
        StoreError::Codec(e) => {
            assert_eq!(e.kind(), ErrorKind::UnknownVariant);
            assert_eq!(e.type_url(), Some("/perp.v1.Fixed"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn traders_scan_by_first_component() {
    let s = state();
    for (who, market) in [("alice", 1u64), ("alice", 2), ("bob", 1), ("alicia", 3)] {
        s.traders.insert(&(who.to_string(), market)).unwrap();
    }
    assert!(s.traders.contains(&("bob".to_string(), 1)).unwrap());
    assert!(!s.traders.contains(&("bob".to_string(), 2)).unwrap());

    let alice = s
        .traders
        .iter_raw_prefix(&pair_prefix(&"alice".to_string()))
        .unwrap();
    assert_eq!(
        alice,
        vec![("alice".to_string(), 1), ("alice".to_string(), 2)]
    );

    assert!(s.traders.remove(&("alice".to_string(), 1)).unwrap());
    assert_eq!(s.traders.iter().unwrap().len(), 3);
}

#[test]
fn foreign_bytes_under_key_set_are_rejected() {
    let s = state();
    s.traders.insert(&("carol".to_string(), 9)).unwrap();
    let raw_key: Vec<u8> = s
        .store
        .scan_prefix(&[2])
        .unwrap()
        .into_iter()
        .map(|(k, _)| k)
        .next()
        .unwrap();
    s.store.set(&raw_key, &[0xde, 0xad]).unwrap();

    let err = s.traders.iter().unwrap_err();
    match err {
        StoreError::Codec(e) => assert_eq!(e.kind(), ErrorKind::ContractViolation),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn collections_do_not_overlap() {
    let s = state();
    s.params.set(&Params::default()).unwrap();
    s.markets.insert(&0, &market("X", None)).unwrap();
    s.traders.insert(&("x".to_string(), 0)).unwrap();
    assert_eq!(s.markets.iter().unwrap().len(), 1);
    assert_eq!(s.traders.iter().unwrap().len(), 1);
    assert_eq!(s.store.len().unwrap(), 3);
}

#[test]
fn pair_keys_iterate_in_tuple_order() {
    let s = state();
    let members = [
        ("b".to_string(), 1u64),
        ("aa".to_string(), 1),
        ("a".to_string(), 300),
        ("a".to_string(), 2),
        ("".to_string(), 7),
    ];
    for key in &members {
        s.traders.insert(key).unwrap();
    }
    let mut sorted = members.to_vec();
    sorted.sort();
    assert_eq!(s.traders.iter().unwrap(), sorted);

    let only_a = s.traders.iter_raw_prefix(&pair_prefix(&"a".to_string())).unwrap();
    assert_eq!(only_a, vec![("a".to_string(), 2), ("a".to_string(), 300)]);
}
