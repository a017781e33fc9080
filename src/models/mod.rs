// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table avec SeaORM (schéma: src/migration).
//
// Liste des modules:
//   - health : Health check API
//   - dto : Data Transfer Objects (requêtes/réponses JSON)
//   - persona : Personnes (identité, DNI, CUIT, email)
//   - empleado : Relation d'emploi d'une persona
//   - usuario : Identifiants de connexion (hash + rôle)
//   - verification_token : Tokens d'invitation / définition du mot de passe
//   - localidad, zona, barrio, categoria, estado : Tables de référence
//   - propiedad : Biens immobiliers
//   - consulta : Demandes des clients
//
// Points d'attention:
//   - Suppression logique partout (deleted / activo), jamais de DELETE
//     sauf pour les tokens
//
// ============================================================================

pub mod health;
pub mod dto;
pub mod persona;
pub mod empleado;
pub mod usuario;
pub mod verification_token;
pub mod localidad;
pub mod zona;
pub mod barrio;
pub mod categoria;
pub mod estado;
pub mod propiedad;
pub mod consulta;
