/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until enough values exist
/// - `Some(avg)` after `window` values
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    // We build a running sum using scan, and subtract the value that falls out of the window.
    values
        .iter()
        .enumerate()
        .scan(0.0_f64, move |sum, (i, &v)| {
            *sum += v;
            if i >= window {
                *sum -= values[i - window];
            }

            let out = if i + 1 >= window {
                Some(*sum / window as f64)
            } else {
                None
            };

            Some(out)
        })
        .collect()
}

/// Exponential Moving Average (EMA)
/// Uses scan to carry previous EMA as state.
/// - returns `None` until enough values exist (optional behavior)
pub fn ema(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if values.is_empty() || window == 0 {
        return vec![None; values.len()];
    }

    let alpha = 2.0 / (window as f64 + 1.0);

    values
        .iter()
        .enumerate()
        .scan(values[0], move |prev_ema, (i, &v)| {
            let next = alpha * v + (1.0 - alpha) * *prev_ema;
            *prev_ema = next;

            // hide early values until window reached (same behavior as before)
            let out = if i + 1 >= window { Some(next) } else { None };
            Some(out)
        })
        .collect()
}

/// Relative Strength Index over `window` periods (Wilder's smoothing).
/// Returns `None` for the first `window` values.
pub fn rsi(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if values.len() < 2 || window == 0 {
        return vec![None; values.len()];
    }

    let mut gains = vec![0.0; values.len()];
    let mut losses = vec![0.0; values.len()];
    for i in 1..values.len() {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let mut out = vec![None; values.len()];
    if values.len() <= window {
        return out;
    }

    let mut avg_gain: f64 = gains[1..=window].iter().sum::<f64>() / window as f64;
    let mut avg_loss: f64 = losses[1..=window].iter().sum::<f64>() / window as f64;

    let rsi_at = |avg_gain: f64, avg_loss: f64| -> f64 {
        if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - (100.0 / (1.0 + rs))
        }
    };

    out[window] = Some(rsi_at(avg_gain, avg_loss));

    for i in (window + 1)..values.len() {
        avg_gain = (avg_gain * (window as f64 - 1.0) + gains[i]) / window as f64;
        avg_loss = (avg_loss * (window as f64 - 1.0) + losses[i]) / window as f64;
        out[i] = Some(rsi_at(avg_gain, avg_loss));
    }

    out
}

/// Linear regression trend line for y-values using x = 0..n-1
/// Returns (slope m, intercept b) for y = m*x + b
///
/// Uses iterator folds rather than mutable loops.
pub fn regression_trend(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    if n == 1 {
        return (0.0, values[0]);
    }

    let n_f = n as f64;

    // Fold over enumerated points to get sums.
    let (sum_x, sum_y, sum_xy, sum_x2) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0, 0.0, 0.0), |(sx, sy, sxy, sx2), (i, &y)| {
            let x = i as f64;
            (
                sx + x,
                sy + y,
                sxy + x * y,
                sx2 + x * x,
            )
        });

    let denom = n_f * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        // fallback: horizontal line at mean
        return (0.0, sum_y / n_f);
    }

    let m = (n_f * sum_xy - sum_x * sum_y) / denom;
    let b = (sum_y - m * sum_x) / n_f;

    (m, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_fills_none_until_window_reached() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn sma_zero_window_is_all_none() {
        assert_eq!(sma(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn ema_converges_toward_a_constant_series() {
        let out = ema(&[10.0; 20], 5);
        let last = out.last().unwrap().unwrap();
        assert!((last - 10.0).abs() < 1e-6);
    }

    #[test]
    fn rsi_is_100_when_there_are_no_losses() {
        let values: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let out = rsi(&values, 14);
        assert_eq!(out[14], Some(100.0));
    }

    #[test]
    fn rsi_short_series_is_all_none() {
        let out = rsi(&[1.0, 2.0, 3.0], 14);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn regression_trend_on_a_straight_line() {
        let values = vec![1.0, 3.0, 5.0, 7.0, 9.0];
        let (m, b) = regression_trend(&values);
        assert!((m - 2.0).abs() < 1e-9);
        assert!((b - 1.0).abs() < 1e-9);
    }

    #[test]
    fn regression_trend_empty_is_flat_at_origin() {
        assert_eq!(regression_trend(&[]), (0.0, 0.0));
    }
}