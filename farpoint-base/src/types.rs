use serde::Deserialize;

/// A candidate point in a d-dimensional space.
///
/// We store the squared norm along with the data: it is the self
/// inner-product, which both the farthest-point update rule and the RBF
/// kernel consume on every evaluation.
///
/// The underlying data type is f64 because selection tolerances default to
/// 1e-12, below what f32 squared distances can resolve.
///
/// We manually implement deserialize in order to be able to compute the norm
/// during de-serialization.
#[derive(Debug, Clone)]
pub struct Vector {
    data: Vec<f64>,
    squared_norm: f64,
}

impl<'de> Deserialize<'de> for Vector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data: Vec<f64> = Vec::deserialize(deserializer)?;
        Ok(Self::new(data))
    }
}

impl Vector {
    pub fn new(data: Vec<f64>) -> Self {
        let squared_norm: f64 = data.iter().map(|x| x * x).sum();
        Self { data, squared_norm }
    }

    pub fn dim(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Compute the inner product between two vectors.
    pub fn inner_product(&self, other: &Self) -> f64 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(x, y)| x * y)
            .sum()
    }

    pub fn squared_norm(&self) -> f64 {
        self.squared_norm
    }

    /// Squared Euclidean distance through the norm identity
    /// `|a - b|^2 = |a|^2 + |b|^2 - 2<a, b>`, clamped at zero so round-off
    /// on (near-)coincident points cannot go negative.
    pub fn squared_distance(&self, other: &Self) -> f64 {
        (self.squared_norm + other.squared_norm - 2.0 * self.inner_product(other)).max(0.0)
    }

    pub fn euclidean_distance(&self, other: &Self) -> f64 {
        self.squared_distance(other).sqrt()
    }
}

/// The two operations the selection engine needs from a candidate type.
pub trait InnerProduct {
    fn inner_product(&self, other: &Self) -> f64;

    fn squared_norm(&self) -> f64;
}

impl InnerProduct for Vector {
    fn inner_product(&self, other: &Self) -> f64 {
        Vector::inner_product(self, other)
    }

    fn squared_norm(&self) -> f64 {
        self.squared_norm
    }
}

#[test]
fn test_squared_distance_identity() {
    let a = Vector::new(vec![1.0, 2.0, 2.0]);
    let b = Vector::new(vec![0.0, -1.0, 2.0]);
    let direct: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    assert!((a.squared_distance(&b) - direct).abs() < 1e-12);
    assert_eq!(a.squared_distance(&a), 0.0);
}

#[test]
fn test_deserialize_recomputes_norm() {
    let v: Vector = serde_json::from_str("[3.0, 4.0]").unwrap();
    assert_eq!(v.squared_norm(), 25.0);
    assert_eq!(v.dim(), 2);
}
