// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROPERTY-BASED TESTS — swapeo-dex
//
// Invariants that MUST hold for ALL inputs: pair-key symmetry, swap math
// bounds, and value conservation across arbitrary sequences of deposits,
// swaps, withdrawals and fee distributions on a live chain.
//
// Run: cargo test --release -p swapeo-dex --test prop_dex
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use proptest::prelude::*;
use swapeo_core::{Address, DexConfig, PairKey, TokenHost};
use swapeo_dex::{check_output, compute_swap, resolve_pair_key};
use swapeo_vm::{account_address, Chain};

const FEE_BPS: u128 = 100;
const SUPPLY: u128 = 1_000_000_000_000;

fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address)
}

// ─────────────────────────────────────────────────────────────────
// PAIR KEY PROPERTIES
// ─────────────────────────────────────────────────────────────────

proptest! {
    /// PROPERTY: the pair key does not depend on argument order
    #[test]
    fn prop_pair_key_symmetric(x in arb_address(), y in arb_address()) {
        prop_assert_eq!(PairKey::of(&x, &y), PairKey::of(&y, &x));
    }

    /// PROPERTY: distinct unordered pairs get distinct keys
    #[test]
    fn prop_pair_key_distinguishes_pairs(
        x in arb_address(),
        y in arb_address(),
        z in arb_address(),
    ) {
        prop_assume!(z != x && z != y);
        prop_assert_ne!(PairKey::of(&x, &y), PairKey::of(&x, &z));
    }

    /// PROPERTY: any zero address is rejected
    #[test]
    fn prop_zero_address_rejected(x in arb_address()) {
        prop_assert!(resolve_pair_key(&Address::ZERO, &x).is_err());
        prop_assert!(resolve_pair_key(&x, &Address::ZERO).is_err());
    }
}

// ─────────────────────────────────────────────────────────────────
// SWAP MATH PROPERTIES
// ─────────────────────────────────────────────────────────────────

proptest! {
    /// PROPERTY: output is always strictly below the output reserve
    #[test]
    fn prop_no_full_drain(
        amount_in in 0u128..=1_000_000_000_000_000_000u128,
        reserve_in in 1u128..=1_000_000_000_000_000_000u128,
        reserve_out in 1u128..=1_000_000_000_000_000_000u128,
    ) {
        let s = compute_swap(amount_in, reserve_in, reserve_out, FEE_BPS).unwrap();
        prop_assert!(s.amount_out < reserve_out);
        prop_assert_eq!(s.fee, amount_in / 100);
        prop_assert_eq!(s.fee + s.amount_net, amount_in);
    }

    /// PROPERTY: more input never yields less output
    #[test]
    fn prop_output_monotonic(
        a1 in 0u128..=1_000_000_000_000u128,
        delta in 0u128..=1_000_000_000_000u128,
        reserve_in in 1u128..=1_000_000_000_000u128,
        reserve_out in 1u128..=1_000_000_000_000u128,
    ) {
        let out1 = compute_swap(a1, reserve_in, reserve_out, FEE_BPS).unwrap().amount_out;
        let out2 = compute_swap(a1 + delta, reserve_in, reserve_out, FEE_BPS).unwrap().amount_out;
        prop_assert!(out2 >= out1);
    }

    /// PROPERTY: reserves after a swap never have a smaller product
    #[test]
    fn prop_constant_product_non_decreasing(
        amount_in in 1u128..=1_000_000_000_000u128,
        reserve_in in 1u128..=1_000_000_000_000u128,
        reserve_out in 1u128..=1_000_000_000_000u128,
    ) {
        let s = compute_swap(amount_in, reserve_in, reserve_out, FEE_BPS).unwrap();
        let k_before = reserve_in * reserve_out;
        let k_after = (reserve_in + s.amount_net) * (reserve_out - s.amount_out);
        prop_assert!(k_after >= k_before);
    }

    /// PROPERTY: accepted outputs respect the 90% bound
    #[test]
    fn prop_check_output_bound(
        amount_out in 0u128..=1_000_000u128,
        reserve_out in 1u128..=1_000_000u128,
    ) {
        if check_output(amount_out, reserve_out, 9_000).is_ok() {
            prop_assert!(amount_out > 0);
            prop_assert!(amount_out * 10_000 <= reserve_out * 9_000);
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// CHAIN-LEVEL CONSERVATION
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Deposit { who: usize, a: u128, b: u128 },
    Swap { who: usize, a_to_b: bool, amount: u128 },
    Withdraw { who: usize, pct: u128 },
    Distribute { fee_in_a: bool },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3, 1u128..=100_000, 1u128..=100_000)
            .prop_map(|(who, a, b)| Op::Deposit { who, a, b }),
        (0usize..3, any::<bool>(), 1u128..=50_000)
            .prop_map(|(who, a_to_b, amount)| Op::Swap { who, a_to_b, amount }),
        (0usize..3, 1u128..=100).prop_map(|(who, pct)| Op::Withdraw { who, pct }),
        any::<bool>().prop_map(|fee_in_a| Op::Distribute { fee_in_a }),
    ]
}

struct World {
    chain: Chain,
    owner: Address,
    users: Vec<Address>,
    tka: Address,
    tkb: Address,
}

fn world() -> World {
    let owner = account_address("owner");
    let mut chain = Chain::new(DexConfig::new(owner, Address::derive("router")), 0).unwrap();
    let tka = chain.host.create_token("TKA", "Token A", 18, SUPPLY, owner).unwrap();
    let tkb = chain.host.create_token("TKB", "Token B", 18, SUPPLY, owner).unwrap();
    let users: Vec<Address> = ["alice", "bob", "carol"]
        .iter()
        .map(|n| account_address(n))
        .collect();
    for user in &users {
        chain.host.transfer(&tka, &owner, user, 10_000_000).unwrap();
        chain.host.transfer(&tkb, &owner, user, 10_000_000).unwrap();
    }
    World {
        chain,
        owner,
        users,
        tka,
        tkb,
    }
}

fn apply(w: &mut World, op: &Op) {
    let dex_addr = w.chain.dex.address();
    let (tka, tkb, owner) = (w.tka, w.tkb, w.owner);
    match *op {
        Op::Deposit { who, a, b } => {
            let user = w.users[who];
            w.chain.host.approve(&tka, &user, &dex_addr, a).unwrap();
            w.chain.host.approve(&tkb, &user, &dex_addr, b).unwrap();
            let _ = w
                .chain
                .execute(|dex, host| dex.deposit(host, user, tka, tkb, a, b));
        }
        Op::Swap { who, a_to_b, amount } => {
            let user = w.users[who];
            let (tin, tout) = if a_to_b { (tka, tkb) } else { (tkb, tka) };
            w.chain.host.approve(&tin, &user, &dex_addr, amount).unwrap();
            let _ = w
                .chain
                .execute(|dex, host| dex.swap(host, user, tin, tout, amount, 0));
        }
        Op::Withdraw { who, pct } => {
            let user = w.users[who];
            let units = w.chain.dex.lp_balance(&tka, &tkb, &tka, &user).unwrap();
            let amount = units * pct / 100;
            if amount > 0 {
                let _ = w
                    .chain
                    .execute(|dex, host| dex.withdraw(host, user, tka, tkb, amount));
            }
        }
        Op::Distribute { fee_in_a } => {
            let token = if fee_in_a { tka } else { tkb };
            let _ = w
                .chain
                .execute(|dex, _| dex.distribute_fees(owner, tka, tkb, token));
        }
    }
}

fn check_invariants(w: &World) -> Result<(), TestCaseError> {
    let dex = &w.chain.dex;
    let dex_addr = dex.address();
    let pair = dex.get_pair(&w.tka, &w.tkb).unwrap();
    let key = PairKey::of(&w.tka, &w.tkb);

    for token in [w.tka, w.tkb] {
        let reserve = pair.side_of(&token).map(|s| pair.reserve(s)).unwrap_or(0);
        let pending = dex.fees_collected(&w.tka, &w.tkb, &token).unwrap();

        // Custody: the contract holds exactly reserves + pending fees
        prop_assert_eq!(w.chain.host.balance_of(&token, &dex_addr), reserve + pending);

        // No token created or destroyed
        let mut total = w.chain.host.balance_of(&token, &dex_addr)
            + w.chain.host.balance_of(&token, &w.owner);
        for user in &w.users {
            total += w.chain.host.balance_of(&token, user);
        }
        prop_assert_eq!(total, SUPPLY);

        // LP units add up to the recorded total
        if let Some(info) = dex.pool_info(&key) {
            let units: u128 = w
                .users
                .iter()
                .map(|u| dex.lp_balance(&w.tka, &w.tkb, &token, u).unwrap())
                .sum();
            let total_units = if token == info.token_a {
                info.total_units_a
            } else {
                info.total_units_b
            };
            prop_assert_eq!(units, total_units);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// PROPERTY: custody, supply and LP-unit totals hold after every step
    #[test]
    fn prop_conservation_over_op_sequences(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut w = world();
        for op in &ops {
            apply(&mut w, op);
            check_invariants(&w)?;
        }
    }

    /// PROPERTY: distribution credits + dust == collected, dust < provider count
    #[test]
    fn prop_fee_conservation_under_distribution(
        deposits in prop::collection::vec(1u128..=1_000_000, 1..=3),
        swap_amount in 100u128..=100_000,
    ) {
        let mut w = world();
        for (i, amount) in deposits.iter().enumerate() {
            apply(&mut w, &Op::Deposit { who: i, a: *amount, b: *amount });
        }
        let liquid = w.chain.dex.pair_state(&w.tka, &w.tkb).unwrap();
        prop_assume!(liquid == swapeo_dex::PairState::Active);

        apply(&mut w, &Op::Swap { who: 0, a_to_b: true, amount: swap_amount });
        let collected = w.chain.dex.fees_collected(&w.tka, &w.tkb, &w.tka).unwrap();
        prop_assume!(collected > 0);

        let before: Vec<u128> = w
            .users
            .iter()
            .map(|u| w.chain.dex.lp_balance(&w.tka, &w.tkb, &w.tka, u).unwrap())
            .collect();
        let (owner, tka, tkb) = (w.owner, w.tka, w.tkb);
        let dist = w
            .chain
            .execute(|dex, _| dex.distribute_fees(owner, tka, tkb, tka))
            .unwrap();

        let gained: u128 = w
            .users
            .iter()
            .zip(&before)
            .map(|(u, b)| w.chain.dex.lp_balance(&tka, &tkb, &tka, u).unwrap() - b)
            .sum();
        prop_assert_eq!(gained + dist.dust, collected);
        prop_assert!(dist.dust < deposits.len() as u128);
        prop_assert_eq!(w.chain.dex.fees_collected(&tka, &tkb, &tka).unwrap(), 0);
        check_invariants(&w)?;
    }
}
