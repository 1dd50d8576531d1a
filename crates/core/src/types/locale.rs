//! Locales and the user-facing messages shown to shoppers.

use serde::{Deserialize, Serialize};

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Bahasa Indonesia.
    #[default]
    Id,
    /// English.
    En,
}

impl Locale {
    /// Pick the preferred supported language from an `Accept-Language` header.
    ///
    /// The highest `q` wins and ties keep header order. `q=0` rules a
    /// language out; entries with a malformed `q` are skipped.
    #[must_use]
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut best: Option<(Self, u16)> = None;
        for part in header.split(',') {
            let mut params = part.split(';');
            let Some(Ok(locale)) = params.next().map(|tag| tag.trim().parse::<Self>()) else {
                continue;
            };
            let quality = params
                .find_map(|param| param.trim().strip_prefix("q="))
                .map_or(Some(QUALITY_SCALE), parse_quality);
            match quality {
                Some(q) if q > 0 && best.is_none_or(|(_, top)| q > top) => {
                    best = Some((locale, q));
                }
                _ => {}
            }
        }
        best.map(|(locale, _)| locale)
    }

    /// The BCP 47 primary language tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::En => "en",
        }
    }
}

/// `q=1` in thousandths.
const QUALITY_SCALE: u16 = 1000;

/// Parse a quality value (`0`, `0.8`, `1.000`) into thousandths.
fn parse_quality(raw: &str) -> Option<u16> {
    let (whole, fraction) = raw.trim().split_once('.').unwrap_or((raw.trim(), ""));
    if fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let thousandths = format!("{fraction:0<3}").parse::<u16>().ok()?;
    match whole {
        "0" => Some(thousandths),
        "1" if thousandths == 0 => Some(QUALITY_SCALE),
        _ => None,
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s.split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "id" | "in" => Ok(Self::Id),
            "en" => Ok(Self::En),
            _ => Err(format!("unsupported locale: {s}")),
        }
    }
}

/// A message shown to a shopper, rendered per locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    CartEmpty,
    InvalidQuantity,
    ProductUnavailable { product: String },
    InsufficientStock { product: String, available: i32 },
    MissingCustomerName,
    InvalidPhone,
    MissingShippingAddress,
    MissingReservationSlot,
    ReservationInPast,
    CheckoutFailed,
    OrderNotFound,
    TooManyRequests,
}

impl Message {
    /// Render the message in `locale`.
    #[must_use]
    pub fn localized(&self, locale: Locale) -> String {
        match (self, locale) {
            (Self::CartEmpty, Locale::Id) => "Keranjang belanja masih kosong.".to_owned(),
            (Self::CartEmpty, Locale::En) => "Your cart is empty.".to_owned(),

            (Self::InvalidQuantity, Locale::Id) => "Jumlah barang minimal 1.".to_owned(),
            (Self::InvalidQuantity, Locale::En) => "Quantity must be at least 1.".to_owned(),

            (Self::ProductUnavailable { product }, Locale::Id) => {
                format!("Produk {product} sudah tidak tersedia.")
            }
            (Self::ProductUnavailable { product }, Locale::En) => {
                format!("{product} is no longer available.")
            }

            (Self::InsufficientStock { product, available }, Locale::Id) => {
                format!("Stok {product} tidak mencukupi (tersisa {available}).")
            }
            (Self::InsufficientStock { product, available }, Locale::En) => {
                format!("Not enough stock for {product} ({available} left).")
            }

            (Self::MissingCustomerName, Locale::Id) => "Nama pemesan wajib diisi.".to_owned(),
            (Self::MissingCustomerName, Locale::En) => "Please enter your name.".to_owned(),

            (Self::InvalidPhone, Locale::Id) => "Nomor WhatsApp tidak valid.".to_owned(),
            (Self::InvalidPhone, Locale::En) => "Invalid WhatsApp number.".to_owned(),

            (Self::MissingShippingAddress, Locale::Id) => {
                "Alamat pengiriman wajib diisi untuk pesanan online.".to_owned()
            }
            (Self::MissingShippingAddress, Locale::En) => {
                "A shipping address is required for online orders.".to_owned()
            }

            (Self::MissingReservationSlot, Locale::Id) => {
                "Pilih tanggal dan jam pengambilan di toko.".to_owned()
            }
            (Self::MissingReservationSlot, Locale::En) => {
                "Please choose a pickup date and time.".to_owned()
            }

            (Self::ReservationInPast, Locale::Id) => {
                "Waktu pengambilan harus di masa mendatang.".to_owned()
            }
            (Self::ReservationInPast, Locale::En) => {
                "The pickup time must be in the future.".to_owned()
            }

            (Self::CheckoutFailed, Locale::Id) => {
                "Pesanan gagal dibuat. Silakan coba lagi.".to_owned()
            }
            (Self::CheckoutFailed, Locale::En) => {
                "We couldn't place your order. Please try again.".to_owned()
            }

            (Self::OrderNotFound, Locale::Id) => "Pesanan tidak ditemukan.".to_owned(),
            (Self::OrderNotFound, Locale::En) => "Order not found.".to_owned(),

            (Self::TooManyRequests, Locale::Id) => {
                "Terlalu banyak permintaan. Coba lagi sebentar lagi.".to_owned()
            }
            (Self::TooManyRequests, Locale::En) => {
                "Too many requests. Please try again shortly.".to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_str() {
        assert_eq!("id".parse::<Locale>(), Ok(Locale::Id));
        assert_eq!("id-ID".parse::<Locale>(), Ok(Locale::Id));
        assert_eq!("en_US".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_from_accept_language_takes_first_supported() {
        assert_eq!(
            Locale::from_accept_language("fr-FR,fr;q=0.9,en-US;q=0.8,id;q=0.7"),
            Some(Locale::En)
        );
        assert_eq!(
            Locale::from_accept_language("id-ID,id;q=0.9"),
            Some(Locale::Id)
        );
        assert_eq!(Locale::from_accept_language("en, id"), Some(Locale::En));
        assert_eq!(Locale::from_accept_language("de,fr"), None);
        assert_eq!(Locale::from_accept_language(""), None);
    }

    #[test]
    fn test_from_accept_language_honors_quality() {
        assert_eq!(
            Locale::from_accept_language("en;q=0.1, id;q=0.9"),
            Some(Locale::Id)
        );
        assert_eq!(Locale::from_accept_language("en;q=0, id"), Some(Locale::Id));
        assert_eq!(
            Locale::from_accept_language("en-US;q=0.5, id-ID;q=0.5"),
            Some(Locale::En)
        );
        assert_eq!(Locale::from_accept_language("id;q=0, en;q=0"), None);
        assert_eq!(
            Locale::from_accept_language("id;q=banana, en;q=0.2"),
            Some(Locale::En)
        );
    }

    #[test]
    fn test_parse_quality() {
        assert_eq!(parse_quality("1"), Some(1000));
        assert_eq!(parse_quality("1.000"), Some(1000));
        assert_eq!(parse_quality("0.8"), Some(800));
        assert_eq!(parse_quality("0.05"), Some(50));
        assert_eq!(parse_quality("0"), Some(0));
        assert_eq!(parse_quality("1.5"), None);
        assert_eq!(parse_quality("0.1234"), None);
        assert_eq!(parse_quality("2"), None);
    }

    #[test]
    fn test_message_localized() {
        let msg = Message::InsufficientStock {
            product: "ThinkPad X1".to_owned(),
            available: 2,
        };
        assert_eq!(
            msg.localized(Locale::En),
            "Not enough stock for ThinkPad X1 (2 left)."
        );
        assert_eq!(
            msg.localized(Locale::Id),
            "Stok ThinkPad X1 tidak mencukupi (tersisa 2)."
        );
    }
}
