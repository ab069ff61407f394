#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Rgba16Float,
    Rgba32Float,
    R8Unorm,
    Depth32Float,
    Depth24Stencil8
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(self, TextureFormat::Depth32Float | TextureFormat::Depth24Stencil8)
    }

    pub fn has_stencil(&self) -> bool {
        matches!(self, TextureFormat::Depth24Stencil8)
    }
}

/// Size of a texture, either in pixels or as a percentage of the backbuffer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TextureSize {
    Absolute {
        width: u32,
        height: u32
    },
    /// Percentages are expressed out of 100.
    Percentage {
        width: f32,
        height: f32
    }
}

impl TextureSize {
    pub fn is_percentage(&self) -> bool {
        matches!(self, TextureSize::Percentage { .. })
    }

    /// Resolves the size against the reference (backbuffer) size.
    ///
    /// Percentage sizes never resolve below one pixel.
    pub fn get_absolute(&self, reference: (u32, u32)) -> (u32, u32) {
        match *self {
            TextureSize::Absolute { width, height } => (width, height),
            TextureSize::Percentage { width, height } => {
                let scaled_width = (reference.0 as f32 * width / 100.0).floor() as u32;
                let scaled_height = (reference.1 as f32 * height / 100.0).floor() as u32;
                (scaled_width.max(1), scaled_height.max(1))
            }
        }
    }
}

impl Default for TextureSize {
    fn default() -> Self {
        TextureSize::Percentage {
            width: 100.0,
            height: 100.0
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextureOptions {
    pub format: TextureFormat,
    pub samples: u32,
    pub create_mip_maps: bool,
    pub label: Option<String>
}

impl Default for TextureOptions {
    fn default() -> Self {
        TextureOptions {
            format: TextureFormat::Rgba8Unorm,
            samples: 1,
            create_mip_maps: false,
            label: None
        }
    }
}

/// What a task asks for when it declares a texture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextureCreationOptions {
    pub size: TextureSize,
    pub options: TextureOptions,
    /// History textures are backed by two textures that swap roles every frame.
    pub is_history: bool
}

impl TextureCreationOptions {
    pub fn new(size: TextureSize) -> Self {
        TextureCreationOptions {
            size,
            ..Default::default()
        }
    }

    pub fn absolute(width: u32, height: u32) -> Self {
        Self::new(TextureSize::Absolute { width, height })
    }

    pub fn percentage(width: f32, height: f32) -> Self {
        Self::new(TextureSize::Percentage { width, height })
    }

    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.options.format = format;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.options.samples = samples;
        self
    }

    pub fn with_mip_maps(mut self) -> Self {
        self.options.create_mip_maps = true;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.options.label = Some(label.to_string());
        self
    }

    pub fn with_history(mut self) -> Self {
        self.is_history = true;
        self
    }

    pub fn size_is_percentage(&self) -> bool {
        self.size.is_percentage()
    }
}

/// A fully resolved texture description, sizes in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureDescription {
    pub width: u32,
    pub height: u32,
    pub options: TextureOptions
}

impl TextureDescription {
    pub fn new(width: u32, height: u32, options: TextureOptions) -> Self {
        TextureDescription {
            width,
            height,
            options
        }
    }

    pub fn from_creation_options(
        creation_options: &TextureCreationOptions,
        reference: (u32, u32)) -> Self {

        let (width, height) = creation_options.size.get_absolute(reference);
        TextureDescription {
            width,
            height,
            options: creation_options.options.clone()
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SamplingMode {
    Nearest,
    Bilinear,
    Trilinear
}
