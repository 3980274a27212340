//! User-facing reply texts (Indonesian).

/// Main menu shown for `list bot`
pub const MAIN_MENU: &str = "🤖 *Selamat datang di Mustari Tani Bot!*\n\n\
Pilih menu berikut ini yaa:\n\n\
🍀 *1.* Print nota yang sudah ada\n\
🧾 *2.* Buat nota baru (isi data pelanggan)\n\n\
Ketik *1* atau *2* aja, aku siap bantu 🌾";

/// Instructions after choosing menu option 1
pub const PRINT_INSTRUCTIONS: &str = "🖨️ Oke siap!\nLangsung aja ketik:\n\n\
`print nota : [nomor nota]/[nama]`\n\n\
Contoh: `print nota : 45/kak fitriadi` 🧾";

/// Customer data format after choosing menu option 2
pub const CUSTOMER_DATA_FORMAT: &str = "📋 Yuk buat nota baru!\n\
Kirim data pelanggan dengan format berikut:\n\n\
Nama : [nama lengkap]\nAlamat : [alamat lengkap]\nTelepon : [nomor telepon]\n\n\
Contoh:\nNama : Budi Setiawan\nAlamat : Bandung Barat\nTelepon : 08123456789";

/// Malformed `print nota` command
pub const PRINT_FORMAT_ERROR: &str =
    "⚠️ Format salah, contoh yang benar:\n`print nota : 45/kak fitriadi`";

/// Sent before rendering an existing nota
pub const PRINT_PREPARING: &str = "🖨️ Sedang menyiapkan nota kamu, tunggu sebentar ya...";

/// Caption of a directly printed nota
pub const PRINT_CAPTION: &str = "🧾 Ini dia nota kamu!";

/// Rendering an existing nota failed
pub const PRINT_FAILED: &str =
    "❌ Nota tidak ditemukan atau server lagi sibuk. Coba lagi nanti ya 🙏";

/// Customer data accepted, asking for the first item
pub const CUSTOMER_SAVED: &str = "✅ Data pelanggan disimpan!\n\
Sekarang kirim data barang pertama dengan format:\n\n\
Barang1\nNama : [nama barang]\nQty : [jumlah]\nHarga : [harga]\n\n\
Contoh:\nBarang1\nNama : Bibit Durian\nQty : 2\nHarga : 500000";

/// Item accepted, asking for the next one or `tidak`
pub const ITEM_SAVED: &str = "🛒 Barang disimpan!\n\
Ketik *Barang2* jika mau tambah barang lagi, atau ketik *tidak* jika sudah selesai belanja 🍃";

/// Item sent before customer data
pub const CUSTOMER_DATA_FIRST: &str = "⚠️ Kirim dulu data pelanggan (nama, alamat, telepon) ya!";

/// `tidak` without an active order
pub const NO_ACTIVE_TRANSACTION: &str =
    "⚠️ Belum ada data transaksi. Mulai dari awal ya (ketik *list bot*) 🌾";

/// Sent before saving the order
pub const SAVING: &str = "💾 Menyimpan data ke server... tunggu sebentar ya ☕";

/// Order saved, rendering the new nota
pub const SAVED_RENDERING: &str = "✅ Transaksi tersimpan! Lagi nyiapin nota digital kamu 🧾✨";

/// Caption of a newly created nota
pub const NEW_NOTA_CAPTION: &str =
    "🧾 Nih nota kamu, makasih udah belanja di Mustari Tani 🍀";

/// Saving or rendering a new order failed
pub const SAVE_FAILED: &str = "❌ Ada kendala saat menyimpan data, coba lagi nanti ya 😅";
