/// A contiguous slice of a deck's cards, priced and persisted as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    /// 1-based.
    pub batch_number: usize,
    pub total_batches: usize,
    /// Index of the first item in the original sequence.
    pub offset: usize,
    pub items: Vec<T>,
    pub size: usize,
}

/// Splits `items` into order-preserving chunks of `batch_size`; only the last may be shorter.
///
/// Panics when `batch_size` is zero.
pub fn create_batches<T: Clone>(items: &[T], batch_size: usize) -> Vec<Batch<T>> {
    assert!(batch_size > 0, "batch size must be greater than zero");

    let total_batches = items.len().div_ceil(batch_size);
    items
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            batch_number: index + 1,
            total_batches,
            offset: index * batch_size,
            items: chunk.to_vec(),
            size: chunk.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::cards::card_request::{parse_deck_list, CardRequest};

    use super::*;

    #[test]
    fn test_batches_cover_input_in_order() {
        for len in 1..=23 {
            let items: Vec<usize> = (0..len).collect();
            for size in 1..=7 {
                let batches = create_batches(&items, size);

                assert_eq!(batches.len(), len.div_ceil(size));
                assert!(batches.iter().all(|b| b.total_batches == batches.len()));
                let (last, full) = batches.split_last().unwrap();
                assert!(full.iter().all(|b| b.size == size && b.items.len() == size));
                assert!(last.size >= 1 && last.size <= size);

                let flattened: Vec<usize> =
                    batches.iter().flat_map(|b| b.items.iter().copied()).collect();
                assert_eq!(flattened, items);
                for (index, batch) in batches.iter().enumerate() {
                    assert_eq!(batch.batch_number, index + 1);
                    assert_eq!(batch.items[0], items[batch.offset]);
                }
            }
        }
    }

    #[test]
    fn test_empty_input_has_no_batches() {
        let batches = create_batches::<CardRequest>(&[], 5);
        assert!(batches.is_empty());
    }

    #[test]
    fn test_small_deck_is_one_batch() {
        let cards = parse_deck_list("4 Lightning Bolt\n2 Counterspell\n1 Black Lotus");

        let batches = create_batches(&cards, 5);

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].size, 3);
        assert_eq!(batches[0].total_batches, 1);
        assert_eq!(batches[0].items, cards);
    }

    #[test]
    #[should_panic(expected = "batch size must be greater than zero")]
    fn test_zero_batch_size_panics() {
        create_batches(&[1, 2, 3], 0);
    }
}
