//! Integration tests for step replay over a real pipeline run.

use consensus_lab::*;

fn demo_block() -> BlockRecord {
    BlockRecord::from_json(&format!(
        r#"{{
            "header": {{
                "version": 536870912,
                "previousblockhash": "{}",
                "merkleroot": "{}",
                "time": 1713571767,
                "bits": "17034219",
                "nonce": 123456,
                "hash": "{}",
                "height": 840000
            }},
            "transactions": [
                {{
                    "txid": "{}",
                    "hash": "{}",
                    "size": 300,
                    "vsize": 273,
                    "weight": 1092,
                    "vin": [ {{ "coinbase": "03a0c42f", "sequence": 4294967295 }} ],
                    "vout": [
                        {{ "value": 3.2, "n": 0, "scriptPubKey": {{ "hex": "0014", "type": "witness_v0_keyhash" }} }}
                    ]
                }}
            ],
            "txCount": 1,
            "size": 300,
            "weight": 1092,
            "strippedsize": 273
        }}"#,
        "11".repeat(32),
        "ab".repeat(32),
        format!("{}1", "0".repeat(63)),
        "c1".repeat(32),
        "c1".repeat(32),
    ))
    .unwrap()
}

fn fresh_replay() -> StepReplay {
    let steps = pipeline::validate_block_at(&demo_block(), 1_713_571_767);
    StepReplay::new(steps)
}

#[test]
fn test_replay_wraps_full_sequence() {
    let replay = fresh_replay();
    assert_eq!(replay.len(), TOTAL_STEPS);
    assert_eq!(replay.cursor(), 0);
    assert_eq!(replay.current().unwrap().id, "1.1");
    assert!(!replay.is_auto_advancing());
}

#[test]
fn test_cursor_bounds() {
    let mut replay = fresh_replay();

    // previous at 0 stays at 0
    assert_eq!(replay.prev_step(), 0);

    // next at N-1 stays at N-1
    replay.jump_to(TOTAL_STEPS - 1);
    assert_eq!(replay.next_step(), TOTAL_STEPS - 1);

    // jump_to outside [0, N-1] clamps into range
    assert_eq!(replay.jump_to(usize::MAX), TOTAL_STEPS - 1);
    assert_eq!(replay.jump_to(0), 0);
}

#[test]
fn test_walk_through_every_step() {
    let mut replay = fresh_replay();
    let mut visited = vec![replay.current().unwrap().id.clone()];

    while !replay.at_last_step() {
        replay.next_step();
        visited.push(replay.current().unwrap().id.clone());
    }

    assert_eq!(visited.len(), TOTAL_STEPS);
    assert_eq!(visited[0], "1.1");
    assert_eq!(visited[TOTAL_STEPS - 1], "5.3");
}

#[test]
fn test_auto_advance_covers_sequence_then_stops() {
    let mut replay = fresh_replay();
    replay.start_auto_advance();

    let mut ticks = 0;
    while replay.tick() {
        ticks += 1;
        assert!(ticks <= TOTAL_STEPS, "auto-advance must terminate");
    }

    assert_eq!(ticks, TOTAL_STEPS - 1);
    assert!(replay.at_last_step());
    assert!(!replay.is_auto_advancing());

    // The last step is a resting state, not a terminal one
    replay.prev_step();
    assert_eq!(replay.cursor(), TOTAL_STEPS - 2);
}

#[test]
fn test_cancelling_auto_advance_never_rolls_back() {
    let mut replay = fresh_replay();
    replay.start_auto_advance();
    replay.tick();
    replay.tick();
    let cursor = replay.cursor();

    replay.stop_auto_advance();
    assert_eq!(replay.cursor(), cursor);
    assert!(!replay.tick());
    assert_eq!(replay.cursor(), cursor);
}

#[test]
fn test_stage_progress_tracks_cursor() {
    let mut replay = fresh_replay();

    // At the start only stage 1 has anything completed
    let progress = replay.stage_progress();
    assert_eq!(progress.len(), 5);
    assert_eq!(progress[0].completed, 1);
    assert!(progress.iter().skip(1).all(|p| p.completed == 0));

    // After stage 1's five steps, stage 2 starts filling in
    replay.jump_to(5);
    let progress = replay.stage_progress();
    assert_eq!(progress[0].completed, progress[0].total);
    assert_eq!(progress[1].completed, 1);

    // At the end every stage is complete
    replay.jump_to(TOTAL_STEPS - 1);
    let progress = replay.stage_progress();
    for p in &progress {
        assert_eq!(p.completed, p.total, "stage {}", p.stage);
    }

    // Totals mirror the static stage table
    for (p, descriptor) in progress.iter().zip(STAGES.iter()) {
        assert_eq!(p.total, descriptor.step_count);
        assert_eq!(p.name, descriptor.name);
    }
}

#[test]
fn test_stage_progress_flags_a_failure() {
    let mut block = demo_block();
    block.header.hash = "f".repeat(64); // proof of work now fails
    let steps = pipeline::validate_block_at(&block, 1_713_571_767);
    let mut replay = StepReplay::new(steps);

    // Before the cursor reaches step 1.5, stage 1 still reads clear
    replay.jump_to(3);
    assert!(replay.stage_progress()[0].all_clear);

    // Once the failing step is completed, the stage flag flips
    replay.jump_to(4);
    assert!(!replay.stage_progress()[0].all_clear);

    // Other stages keep their own aggregation
    replay.jump_to(TOTAL_STEPS - 1);
    let progress = replay.stage_progress();
    assert!(!progress[0].all_clear);
    assert!(progress[1].all_clear);
}
