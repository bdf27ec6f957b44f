use crate::settings::Participant;

/// Participants tied for the lowest `count`, in list order.
///
/// Nobody is asked again before everyone else has caught up, so the result
/// is the pool the next subject is drawn from. Empty only for empty input.
pub fn select_candidates(participants: &[Participant]) -> Vec<Participant> {
    select_candidate_indices(participants)
        .into_iter()
        .map(|idx| participants[idx].clone())
        .collect()
}

/// Same as [`select_candidates`], but yields positions in the participant list.
/// Position is the participant's identity, names may repeat.
pub fn select_candidate_indices(participants: &[Participant]) -> Vec<usize> {
    let Some(min) = participants.iter().map(|p| p.count).min() else {
        return Vec::new();
    };

    participants
        .iter()
        .enumerate()
        .filter(|(_, p)| p.count == min)
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::pick_uniform;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn people(list: &[(&str, u32)]) -> Vec<Participant> {
        list.iter()
            .map(|(name, count)| Participant {
                name: name.to_string(),
                count: *count,
            })
            .collect()
    }

    #[test]
    fn test_select_candidates_returns_minimum_group() {
        let participants = people(&[("a", 2), ("b", 0), ("c", 0)]);
        assert_eq!(
            select_candidates(&participants),
            people(&[("b", 0), ("c", 0)])
        );
    }

    #[test]
    fn test_select_candidates_all_tied() {
        let participants = people(&[("a", 1), ("b", 1), ("c", 1)]);
        assert_eq!(select_candidates(&participants), participants);
    }

    #[test]
    fn test_select_candidates_single_participant() {
        let participants = people(&[("solo", 7)]);
        assert_eq!(select_candidates(&participants), participants);
    }

    #[test]
    fn test_select_candidates_empty_input() {
        assert!(select_candidates(&[]).is_empty());
        assert!(select_candidate_indices(&[]).is_empty());
    }

    #[test]
    fn test_duplicate_names_are_distinct_candidates() {
        let participants = people(&[("kari", 0), ("kari", 1), ("kari", 0)]);
        assert_eq!(select_candidate_indices(&participants), vec![0, 2]);
    }

    #[test]
    fn test_candidates_never_empty_and_always_minimal() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let len = rand::Rng::gen_range(&mut rng, 1..8);
            let participants: Vec<Participant> = (0..len)
                .map(|i| Participant {
                    name: format!("p{i}"),
                    count: rand::Rng::gen_range(&mut rng, 0..4),
                })
                .collect();
            let min = participants.iter().map(|p| p.count).min().unwrap();
            let candidates = select_candidates(&participants);

            assert!(!candidates.is_empty());
            assert!(candidates.iter().all(|p| p.count == min));
            assert_eq!(
                candidates.len(),
                participants.iter().filter(|p| p.count == min).count()
            );
        }
    }

    #[test]
    fn test_ties_are_broken_fairly() {
        let participants = people(&[("a", 2), ("b", 0), ("c", 0)]);
        let mut rng = StdRng::seed_from_u64(12);
        let (mut b, mut c) = (0, 0);
        for _ in 0..2000 {
            let candidates = select_candidates(&participants);
            match pick_uniform(&mut rng, &candidates).unwrap().name.as_str() {
                "b" => b += 1,
                "c" => c += 1,
                other => panic!("{other} should never be picked"),
            }
        }
        assert!((800..1200).contains(&b), "b picked {b} times");
        assert!((800..1200).contains(&c), "c picked {c} times");
    }
}
