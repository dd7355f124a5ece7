///////////////////
// Vector macros //
///////////////////

/// Assertion that every vector in a slice has the same length.
#[macro_export]
macro_rules! assert_uniform_len {
    ($vecs:expr) => {
        {
            let lengths: Vec<usize> = $vecs.iter().map(|v| v.len()).collect();

            if let Some(&first_len) = lengths.first() {
                if !lengths.iter().all(|&len| len == first_len) {
                    panic!(
                        "Vectors have different lengths: {:?}",
                        lengths
                    );
                }
            }
        }
    };
}
