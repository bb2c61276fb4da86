use crate::{math::matrix::Matrix, layers::dense::Layer};
use crate::optim::Optimizer;

/// First and second moment estimates for one layer's parameters.
struct Moments {
    m_w: Matrix,
    v_w: Matrix,
    m_b: Matrix,
    v_b: Matrix,
}

impl Moments {
    fn for_layer(layer: &Layer) -> Moments {
        let (wr, wc) = (layer.weights.rows, layer.weights.cols);
        let (br, bc) = (layer.biases.rows, layer.biases.cols);
        Moments {
            m_w: Matrix::zeros(wr, wc),
            v_w: Matrix::zeros(wr, wc),
            m_b: Matrix::zeros(br, bc),
            v_b: Matrix::zeros(br, bc),
        }
    }
}

/// Adam optimizer (Kingma & Ba) with bias-corrected moment estimates.
///
/// Defaults match the common Keras settings: lr 0.001, β1 0.9, β2 0.999,
/// ε 1e-7. Moment buffers are allocated lazily the first time a layer is
/// stepped.
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: i32,
    moments: Vec<Option<Moments>>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Adam {
        Adam {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            t: 0,
            moments: Vec::new(),
        }
    }

    /// Number of completed `begin_step` calls.
    pub fn steps(&self) -> i32 {
        self.t
    }
}

impl Default for Adam {
    fn default() -> Self {
        Adam::new(0.001)
    }
}

/// Applies one Adam update to `params` in place.
#[allow(clippy::too_many_arguments)]
fn update(
    params: &mut Matrix,
    grad: &Matrix,
    m: &mut Matrix,
    v: &mut Matrix,
    lr_t: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
) {
    for r in 0..params.rows {
        let (p_row, g_row) = (&mut params.data[r], &grad.data[r]);
        let (m_row, v_row) = (&mut m.data[r], &mut v.data[r]);
        for c in 0..p_row.len() {
            let g = g_row[c];
            m_row[c] = beta1 * m_row[c] + (1.0 - beta1) * g;
            v_row[c] = beta2 * v_row[c] + (1.0 - beta2) * g * g;
            p_row[c] -= lr_t * m_row[c] / (v_row[c].sqrt() + epsilon);
        }
    }
}

impl Optimizer for Adam {
    fn begin_step(&mut self) {
        self.t += 1;
    }

    fn step(&mut self, index: usize, layer: &mut Layer, weights_grad: &Matrix, biases_grad: &Matrix) {
        if self.moments.len() <= index {
            self.moments.resize_with(index + 1, || None);
        }
        let moments = self.moments[index].get_or_insert_with(|| Moments::for_layer(layer));

        // Fold both bias corrections into the step size.
        let t = self.t.max(1);
        let lr_t = self.learning_rate
            * (1.0 - self.beta2.powi(t)).sqrt()
            / (1.0 - self.beta1.powi(t));

        update(&mut layer.weights, weights_grad, &mut moments.m_w, &mut moments.v_w,
               lr_t, self.beta1, self.beta2, self.epsilon);
        update(&mut layer.biases, biases_grad, &mut moments.m_b, &mut moments.v_b,
               lr_t, self.beta1, self.beta2, self.epsilon);
    }
}
