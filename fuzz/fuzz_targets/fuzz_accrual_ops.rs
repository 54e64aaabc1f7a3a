#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use trickle_accrual::AccrualLedger;
use trickle_interfaces::AssetLedger;
use trickle_nullables::{NullAccessControl, NullAsset, NullClock};
use trickle_types::{AccountId, AssetId};

#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Deposit { who: u8, amount: u128 },
    Withdraw { who: u8, amount: u128 },
    Claim { who: u8 },
    Fund { amount: u128 },
    Advance { secs: u32 },
    Rewind { secs: u32 },
    SetRate { caller: u8, rate: u128 },
    Drain { caller: u8 },
    FailNext,
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    rate: u64,
    ops: Vec<FuzzOp>,
}

const CUSTODIAN: u8 = 0xC0;
const OWNER: u8 = 0xA0;

fn id(n: u8) -> AccountId {
    AccountId::new([n; 32])
}

// Drive the ledger with arbitrary operation sequences, including huge
// amounts, clock regressions and injected transfer failures. Nothing may
// panic, and conservation must hold after every step.
fuzz_target!(|input: FuzzInput| {
    let clock = NullClock::new(1_000_000);
    let mut stake = NullAsset::new(AssetId::new("STAKE").unwrap());
    let mut reward = NullAsset::new(AssetId::new("REWARD").unwrap());
    for who in 0..8u8 {
        stake.mint(&id(who), u128::MAX / 16);
        stake.approve(&id(who), &id(CUSTODIAN), u128::MAX / 16);
    }
    reward.mint(&id(OWNER), u128::MAX / 2);
    reward.approve(&id(OWNER), &id(CUSTODIAN), u128::MAX / 2);

    let Ok(mut ledger) = AccrualLedger::new(
        id(CUSTODIAN),
        u128::from(input.rate),
        stake,
        reward,
        NullAccessControl::new(id(OWNER)),
        clock.clone(),
    ) else {
        return;
    };

    for op in input.ops.iter().take(256) {
        let _ = match *op {
            FuzzOp::Deposit { who, amount } => ledger.deposit(&id(who % 8), amount),
            FuzzOp::Withdraw { who, amount } => ledger.withdraw(&id(who % 8), amount),
            FuzzOp::Claim { who } => ledger.claim_rewards(&id(who % 8)).map(|_| ()),
            FuzzOp::Fund { amount } => ledger.fund_rewards(&id(OWNER), amount),
            FuzzOp::Advance { secs } => {
                clock.advance(u64::from(secs));
                Ok(())
            }
            FuzzOp::Rewind { secs } => {
                let now = trickle_interfaces::Clock::now(&clock).as_secs();
                clock.set(now.saturating_sub(u64::from(secs)));
                Ok(())
            }
            FuzzOp::SetRate { caller, rate } => ledger.set_emission_rate(&id(caller), rate),
            FuzzOp::Drain { caller } => ledger.emergency_drain(&id(caller)).map(|_| ()),
            FuzzOp::FailNext => {
                ledger.stake_asset_mut().fail_next_transfer();
                ledger.reward_asset_mut().fail_next_transfer();
                Ok(())
            }
        };

        let sum: u128 = ledger.accounts().map(|(_, s)| s.deposited).sum();
        assert_eq!(sum, ledger.total_staked());
        assert_eq!(
            ledger.stake_asset().balance_of(&id(CUSTODIAN)),
            ledger.total_staked()
        );
        let _ = ledger.pending_reward_of(&id(0));
        let _ = ledger.reward_per_token();
    }

    if let Ok(bytes) = ledger.snapshot().to_bytes() {
        let decoded = trickle_accrual::LedgerSnapshot::from_bytes(&bytes).unwrap();
        decoded.verify().unwrap();
    }
});
