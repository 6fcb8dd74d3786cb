use crate::{AdjustmentKind, SliderValues};

/// Rec. 709 luminance weights, shared by the saturate and grayscale operators.
pub const LUMA_R: f32 = 0.2126;
pub const LUMA_G: f32 = 0.7152;
pub const LUMA_B: f32 = 0.0722;

/// Row-major 4x5 affine color transform on normalized RGBA.
///
/// Each output channel is a dot product of the input RGBA with the row's
/// first four coefficients, plus the fifth column as an additive offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    rows: [[f32; 5]; 4],
}

impl ColorMatrix {
    pub const fn identity() -> Self {
        Self {
            rows: [
                [1.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0, 0.0],
            ],
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Uniform RGB gain. `value` is the normalized slider position in
    /// [-1, 1]; the multiplier is `value + 1`, so +1 doubles and -1 blacks out.
    pub fn brightness(value: f32) -> Self {
        let scale = value + 1.0;
        Self::channel_scales(scale, scale, scale)
    }

    /// RGB gain pivoted at mid-gray, which stays a fixed point.
    pub fn contrast(value: f32) -> Self {
        let scale = value + 1.0;
        let offset = (1.0 - scale) / 2.0;
        let mut matrix = Self::channel_scales(scale, scale, scale);
        matrix.rows[0][4] = offset;
        matrix.rows[1][4] = offset;
        matrix.rows[2][4] = offset;
        matrix
    }

    /// Luminance-weighted saturate operator with strength `value + 1`.
    ///
    /// At strength 0 this collapses to [`ColorMatrix::grayscale`]; full
    /// desaturation is still routed through the explicit grayscale
    /// constructor by the compiler.
    pub fn saturation(value: f32) -> Self {
        let strength = value + 1.0;
        let base_r = LUMA_R * (1.0 - strength);
        let base_g = LUMA_G * (1.0 - strength);
        let base_b = LUMA_B * (1.0 - strength);
        Self {
            rows: [
                [base_r + strength, base_g, base_b, 0.0, 0.0],
                [base_r, base_g + strength, base_b, 0.0, 0.0],
                [base_r, base_g, base_b + strength, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0, 0.0],
            ],
        }
    }

    /// Full desaturation: every RGB row is the luminance weights.
    pub fn grayscale() -> Self {
        Self {
            rows: [
                [LUMA_R, LUMA_G, LUMA_B, 0.0, 0.0],
                [LUMA_R, LUMA_G, LUMA_B, 0.0, 0.0],
                [LUMA_R, LUMA_G, LUMA_B, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0, 0.0],
            ],
        }
    }

    /// Warm/cool balance as a diagonal red/blue scale: positive values push
    /// red up and blue down by 20% per unit, negative the reverse.
    pub fn temperature(value: f32) -> Self {
        let red_scale = 1.0 + value * 0.2;
        let blue_scale = 1.0 - value * 0.2;
        Self::channel_scales(red_scale, 1.0, blue_scale)
    }

    fn channel_scales(red: f32, green: f32, blue: f32) -> Self {
        let mut matrix = Self::identity();
        matrix.rows[0][0] = red;
        matrix.rows[1][1] = green;
        matrix.rows[2][2] = blue;
        matrix
    }

    /// Composition: the returned matrix applies `self` first, then `next`.
    pub fn then(&self, next: &ColorMatrix) -> ColorMatrix {
        let mut rows = [[0.0_f32; 5]; 4];
        for (i, out_row) in rows.iter_mut().enumerate() {
            for j in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += next.rows[i][k] * self.rows[k][j];
                }
                out_row[j] = sum;
            }
            let mut offset = next.rows[i][4];
            for k in 0..4 {
                offset += next.rows[i][k] * self.rows[k][4];
            }
            out_row[4] = offset;
        }
        ColorMatrix { rows }
    }

    /// Apply to one normalized RGBA sample. No clamping; consumers clamp
    /// when quantizing back to bytes.
    pub fn transform_rgba(&self, rgba: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0_f32; 4];
        for (i, row) in self.rows.iter().enumerate() {
            out[i] = row[0] * rgba[0] + row[1] * rgba[1] + row[2] * rgba[2] + row[3] * rgba[3]
                + row[4];
        }
        out
    }

    pub fn rows(&self) -> &[[f32; 5]; 4] {
        &self.rows
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// One compiled adjustment: the kind it came from and its matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorFilter {
    pub kind: AdjustmentKind,
    pub matrix: ColorMatrix,
}

/// Sparse filter compilation: one matrix per non-default slider, in the
/// fixed order brightness, contrast, saturation, temperature.
///
/// Slider values are normalized by 100 and clamped to [-1, 1]. A slider at
/// exactly 0 contributes nothing; saturation at exactly -100 produces the
/// explicit grayscale transform instead of the general saturate operator.
pub fn compile_filters(values: &SliderValues) -> Vec<ColorFilter> {
    let mut filters = Vec::new();

    for kind in AdjustmentKind::ALL {
        let raw = values.get(kind);
        if raw == 0.0 {
            continue;
        }
        let normalized = normalize(raw);
        let matrix = match kind {
            AdjustmentKind::Brightness => ColorMatrix::brightness(normalized),
            AdjustmentKind::Contrast => ColorMatrix::contrast(normalized),
            AdjustmentKind::Saturation => {
                if normalized == -1.0 {
                    ColorMatrix::grayscale()
                } else {
                    ColorMatrix::saturation(normalized)
                }
            }
            AdjustmentKind::Temperature => ColorMatrix::temperature(normalized),
        };
        filters.push(ColorFilter { kind, matrix });
    }

    filters
}

/// Collapse a filter list into the single matrix GPU uniforms and the
/// exporter consume. An empty list collapses to the identity.
pub fn compose(filters: &[ColorFilter]) -> ColorMatrix {
    filters
        .iter()
        .fold(ColorMatrix::identity(), |acc, filter| acc.then(&filter.matrix))
}

fn normalize(value: f32) -> f32 {
    (value / 100.0).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_sliders_compile_to_an_empty_filter_list() {
        let filters = compile_filters(&SliderValues::default());
        assert!(filters.is_empty());
        assert!(compose(&filters).is_identity());
    }

    #[test]
    fn full_brightness_is_a_single_doubling_filter() {
        let values = SliderValues {
            brightness: 100.0,
            ..SliderValues::default()
        };
        let filters = compile_filters(&values);
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].kind, AdjustmentKind::Brightness);
        assert_close(filters[0].matrix.rows()[0][0], 2.0);
        assert_close(filters[0].matrix.rows()[1][1], 2.0);
        assert_close(filters[0].matrix.rows()[2][2], 2.0);
    }

    #[test]
    fn full_desaturation_uses_the_explicit_grayscale_transform() {
        let values = SliderValues {
            saturation: -100.0,
            ..SliderValues::default()
        };
        let filters = compile_filters(&values);
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].matrix, ColorMatrix::grayscale());

        let out = filters[0].matrix.transform_rgba([1.0, 0.0, 0.0, 1.0]);
        assert_close(out[0], LUMA_R);
        assert_close(out[1], LUMA_R);
        assert_close(out[2], LUMA_R);
    }

    #[test]
    fn contrast_keeps_mid_gray_fixed() {
        let matrix = ColorMatrix::contrast(0.6);
        let out = matrix.transform_rgba([0.5, 0.5, 0.5, 1.0]);
        assert_close(out[0], 0.5);
        assert_close(out[1], 0.5);
        assert_close(out[2], 0.5);

        let bright = matrix.transform_rgba([0.75, 0.75, 0.75, 1.0]);
        assert!(bright[0] > 0.75);
    }

    #[test]
    fn temperature_scales_red_against_blue() {
        let warm = ColorMatrix::temperature(0.15);
        assert_close(warm.rows()[0][0], 1.03);
        assert_close(warm.rows()[1][1], 1.0);
        assert_close(warm.rows()[2][2], 0.97);

        let cool = ColorMatrix::temperature(-1.0);
        assert_close(cool.rows()[0][0], 0.8);
        assert_close(cool.rows()[2][2], 1.2);
    }

    #[test]
    fn neutral_saturation_is_the_identity() {
        let matrix = ColorMatrix::saturation(0.0);
        let sample = matrix.transform_rgba([0.3, 0.6, 0.9, 1.0]);
        assert_close(sample[0], 0.3);
        assert_close(sample[1], 0.6);
        assert_close(sample[2], 0.9);
    }

    #[test]
    fn saturate_preserves_gray_axis() {
        let matrix = ColorMatrix::saturation(0.7);
        let out = matrix.transform_rgba([0.4, 0.4, 0.4, 1.0]);
        assert_close(out[0], 0.4);
        assert_close(out[1], 0.4);
        assert_close(out[2], 0.4);
    }

    #[test]
    fn compose_applies_filters_in_list_order() {
        let values = SliderValues {
            brightness: 50.0,
            contrast: 20.0,
            ..SliderValues::default()
        };
        let filters = compile_filters(&values);
        assert_eq!(filters.len(), 2);

        let collapsed = compose(&filters);
        let sample = [0.2_f32, 0.2, 0.2, 1.0];
        let stepwise = filters[1]
            .matrix
            .transform_rgba(filters[0].matrix.transform_rgba(sample));
        let direct = collapsed.transform_rgba(sample);
        for channel in 0..4 {
            assert_close(direct[channel], stepwise[channel]);
        }
    }

    #[test]
    fn out_of_range_values_clamp_at_normalization() {
        let values = SliderValues {
            brightness: 250.0,
            ..SliderValues::default()
        };
        let filters = compile_filters(&values);
        assert_close(filters[0].matrix.rows()[0][0], 2.0);
    }

    #[test]
    fn matrix_alpha_row_is_untouched_by_color_operators() {
        for matrix in [
            ColorMatrix::brightness(0.4),
            ColorMatrix::contrast(-0.3),
            ColorMatrix::saturation(0.5),
            ColorMatrix::grayscale(),
            ColorMatrix::temperature(0.2),
        ] {
            assert_eq!(matrix.rows()[3], [0.0, 0.0, 0.0, 1.0, 0.0]);
        }
    }
}
