use rand::seq::SliceRandom;
use rand::Rng;

/// Randomized train/test partition of a labeled sample set.
#[derive(Debug, Clone, Default)]
pub struct Split {
    pub train_inputs: Vec<Vec<f64>>,
    pub train_classes: Vec<usize>,
    pub test_inputs: Vec<Vec<f64>>,
    pub test_classes: Vec<usize>,
}

/// Shuffles the rows and holds out `ceil(n * test_fraction)` of them for
/// testing, always leaving at least one row for training.
///
/// `test_fraction` is clamped to `[0, 1]`.
pub fn train_test_split<R: Rng + ?Sized>(
    features: Vec<Vec<f64>>,
    classes: Vec<usize>,
    test_fraction: f64,
    rng: &mut R,
) -> Split {
    let mut rows: Vec<(Vec<f64>, usize)> = features.into_iter().zip(classes).collect();
    rows.shuffle(rng);

    let n = rows.len();
    let wanted = (n as f64 * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
    let n_test = wanted.min(n.saturating_sub(1));

    let test_rows = rows.split_off(n - n_test);
    let (train_inputs, train_classes) = rows.into_iter().unzip();
    let (test_inputs, test_classes) = test_rows.into_iter().unzip();

    Split { train_inputs, train_classes, test_inputs, test_classes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rows(n: usize) -> (Vec<Vec<f64>>, Vec<usize>) {
        ((0..n).map(|i| vec![i as f64]).collect(), (0..n).collect())
    }

    #[test]
    fn eighty_twenty_keeps_every_row_once() {
        let (features, classes) = rows(10);
        let split = train_test_split(features, classes, 0.2, &mut StdRng::seed_from_u64(7));
        assert_eq!(split.train_inputs.len(), 8);
        assert_eq!(split.test_inputs.len(), 2);

        let mut seen: Vec<usize> = split.train_classes.iter().chain(&split.test_classes).copied().collect();
        seen.sort();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        // Features stay attached to their class.
        for (f, c) in split.train_inputs.iter().zip(&split.train_classes) {
            assert_eq!(f[0] as usize, *c);
        }
    }

    #[test]
    fn same_seed_same_split() {
        let (f1, c1) = rows(25);
        let (f2, c2) = rows(25);
        let a = train_test_split(f1, c1, 0.2, &mut StdRng::seed_from_u64(42));
        let b = train_test_split(f2, c2, 0.2, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.test_classes, b.test_classes);
    }

    #[test]
    fn rounds_test_size_up_but_keeps_a_training_row() {
        let (f, c) = rows(3);
        let split = train_test_split(f, c, 0.2, &mut rand::thread_rng());
        assert_eq!(split.test_inputs.len(), 1);

        let (f, c) = rows(1);
        let split = train_test_split(f, c, 0.2, &mut rand::thread_rng());
        assert_eq!(split.train_inputs.len(), 1);
        assert!(split.test_inputs.is_empty());
    }
}
