/// An 8-bit RGBA color. Alpha `0` is fully transparent, `255` fully opaque.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 255 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Composites `self` over `dst` (Porter-Duff "over").
    pub fn blend_over(self, dst: Rgba) -> Rgba {
        if self.is_opaque() || dst.is_transparent() {
            return self;
        }
        if self.is_transparent() {
            return dst;
        }

        let src_a = self.a as f64 / 255.0;
        let dst_a = dst.a as f64 / 255.0 * (1.0 - src_a);
        let out_a = src_a + dst_a;
        let channel = |s: u8, d: u8| {
            ((s as f64 * src_a + d as f64 * dst_a) / out_a)
                .round()
                .clamp(0.0, 255.0) as u8
        };

        Rgba {
            r: channel(self.r, dst.r),
            g: channel(self.g, dst.g),
            b: channel(self.b, dst.b),
            a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        }
    }
}

/// Maps every index of a source palette to a destination palette index, or
/// to `None` when the source index must not be drawn.
pub type ColorMap = [Option<u8>; 256];

/// A color table of at most 256 entries, with an optional transparent index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<[u8; 3]>,
    transparent: Option<u8>,
}

impl Palette {
    pub const MAX_ENTRIES: usize = 256;

    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a palette from `entries`; anything past 256 entries is dropped.
    pub fn from_entries(mut entries: Vec<[u8; 3]>) -> Self {
        entries.truncate(Self::MAX_ENTRIES);
        Palette {
            entries,
            transparent: None,
        }
    }

    pub fn with_transparent(mut self, index: u8) -> Self {
        self.transparent = Some(index);
        self
    }

    pub fn transparent(&self) -> Option<u8> {
        self.transparent
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, index: u8) -> Option<[u8; 3]> {
        self.entries.get(index as usize).copied()
    }

    /// Returns the index of `rgb`, allocating a new entry if the palette has
    /// room, or falling back to the closest existing color otherwise.
    ///
    /// The transparent entry is never returned.
    pub fn find_or_allocate(&mut self, rgb: [u8; 3]) -> Option<u8> {
        let usable = |(i, _): &(usize, &[u8; 3])| Some(*i as u8) != self.transparent;

        if let Some((i, _)) = self
            .entries
            .iter()
            .enumerate()
            .filter(usable)
            .find(|(_, e)| **e == rgb)
        {
            return Some(i as u8);
        }

        if self.entries.len() < Self::MAX_ENTRIES {
            self.entries.push(rgb);
            return Some((self.entries.len() - 1) as u8);
        }

        self.entries
            .iter()
            .enumerate()
            .filter(usable)
            .min_by_key(|(_, e)| {
                e.iter()
                    .zip(rgb.iter())
                    .map(|(a, b)| (*a as i32 - *b as i32).pow(2))
                    .sum::<i32>()
            })
            .map(|(i, _)| i as u8)
    }

    /// Computes the remapping of every index of `self` onto `dst`, allocating
    /// destination colors as needed.
    ///
    /// Unused indices and the transparent index map to `None`.
    pub fn color_map(&self, dst: &mut Palette) -> ColorMap {
        let mut cmap: ColorMap = [None; 256];
        for (i, rgb) in self.entries.iter().enumerate() {
            if Some(i as u8) == self.transparent {
                continue;
            }
            cmap[i] = dst.find_or_allocate(*rgb);
        }
        cmap
    }
}
